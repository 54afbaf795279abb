// Copyright (c) the spacetimedb-client authors 2025
// This file is licensed under the MIT, see license.md file

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Everything that can go wrong talking to a SpacetimeDB server.
///
/// Each operation documents the variants it can produce. Errors are
/// surfaced to the immediate caller; the client never retries.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
	#[error("invalid base URL: {0}")]
	InvalidEndpoint(#[from] url::ParseError),

	#[error("token is required for this operation")]
	MissingCredential,

	#[error("unexpected status code: {0}")]
	UnexpectedStatus(u16),

	#[error("error decoding response: {0}")]
	Decode(#[source] serde_json::Error),

	#[error("error encoding request: {0}")]
	Encode(#[source] serde_json::Error),

	#[error("error connecting to socket: {0}")]
	Connection(String),

	#[error("transport error: {0}")]
	Transport(String),

	#[error("connection not established")]
	NotConnected,

	#[error("error closing connection: {0}")]
	Close(String),
}

impl From<reqwest::Error> for ClientError {
	fn from(err: reqwest::Error) -> Self {
		ClientError::Transport(err.to_string())
	}
}
