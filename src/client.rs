// Copyright (c) the spacetimedb-client authors 2025
// This file is licensed under the MIT, see license.md file

use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;
use url::Url;

use crate::{
	error::{ClientError, Result},
	ws::Connection,
};

/// Timeout applied to every HTTP request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// One logical client session against a SpacetimeDB server.
///
/// A `Client` holds the base endpoint, the bearer credential (if any)
/// and at most one live socket [`Connection`]. Construct with
/// [`Client::new`], configure with the `with_*` builders before first
/// use, and tear down with [`Client::close`]. A closed client is not
/// reusable.
pub struct Client {
	pub(crate) base_url: Url,
	pub(crate) http: reqwest::Client,
	pub(crate) token: Option<String>,
	pub(crate) identity: Option<String>,
	pub(crate) cancel: CancellationToken,
	pub(crate) connection: Mutex<Option<Connection>>,
}

impl std::fmt::Debug for Client {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Client")
			.field("base_url", &self.base_url)
			.field("token", &self.token.as_ref().map(|_| "<redacted>"))
			.field("identity", &self.identity)
			.finish_non_exhaustive()
	}
}

impl Client {
	/// Create a new client for the given base endpoint.
	///
	/// Fails with [`ClientError::InvalidEndpoint`] when the string is
	/// not a well-formed absolute URL. The endpoint is immutable for
	/// the lifetime of the client.
	pub fn new(base_url: &str) -> Result<Self> {
		let base_url = Url::parse(base_url)?;
		let http = reqwest::Client::builder()
			.timeout(HTTP_TIMEOUT)
			.build()
			.map_err(|e| ClientError::Transport(e.to_string()))?;

		Ok(Self {
			base_url,
			http,
			token: None,
			identity: None,
			cancel: CancellationToken::new(),
			connection: Mutex::new(None),
		})
	}

	/// Set the bearer token used for authenticated requests.
	///
	/// Builders apply in call order; a later call overrides an
	/// earlier one.
	pub fn with_token(mut self, token: impl Into<String>) -> Self {
		self.token = Some(token.into());
		self
	}

	/// Set the identity this client acts as.
	pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
		self.identity = Some(identity.into());
		self
	}

	/// The base endpoint this client was constructed with.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// The configured bearer token, if any.
	pub fn token(&self) -> Option<&str> {
		self.token.as_deref()
	}

	/// The configured identity, if any.
	pub fn identity(&self) -> Option<&str> {
		self.identity.as_deref()
	}

	/// The `Authorization` header value for the configured token.
	///
	/// Empty when no token is set. Pure; callable at any time.
	pub fn auth_header(&self) -> String {
		match self.token.as_deref() {
			Some(token) if !token.is_empty() => {
				format!("Bearer {token}")
			}
			_ => String::new(),
		}
	}

	/// A handle to the session lifetime token.
	///
	/// The token is cancelled by [`Client::close`]. Cancellation does
	/// not interrupt an in-flight [`receive`](Client::receive); it is
	/// a cooperative shutdown signal for caller-owned background
	/// loops.
	pub fn cancel_token(&self) -> CancellationToken {
		self.cancel.clone()
	}

	/// Whether this session has been closed.
	pub fn is_closed(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Close the session.
	///
	/// Tears down the open connection, if any, and cancels the
	/// lifetime token. The token is cancelled even when the
	/// connection refuses to close cleanly, so resources tied to it
	/// are never leaked; the close failure is still reported as
	/// [`ClientError::Close`].
	pub async fn close(&self) -> Result<()> {
		let connection = self.connection.lock().await.take();
		let result = match connection {
			Some(connection) => connection.close().await,
			None => Ok(()),
		};
		// Must run regardless of how the teardown went.
		self.cancel.cancel();
		if result.is_ok() {
			info!("session closed");
		}
		result
	}

	/// The configured token, or `MissingCredential` when absent or
	/// empty. Guards run before any network I/O.
	pub(crate) fn require_token(&self) -> Result<&str> {
		match self.token.as_deref() {
			Some(token) if !token.is_empty() => Ok(token),
			_ => Err(ClientError::MissingCredential),
		}
	}

	/// Resolve a path against the base endpoint.
	pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
		let raw = format!(
			"{}{}",
			self.base_url.as_str().trim_end_matches('/'),
			path
		);
		Ok(Url::parse(&raw)?)
	}
}
