// Copyright (c) the spacetimedb-client authors 2025
// This file is licensed under the MIT, see license.md file

use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	time::Duration,
};

use futures_util::{
	SinkExt, StreamExt,
	stream::{SplitSink, SplitStream},
};
use serde::Serialize;
use serde_json::Value;
use tokio::{net::TcpStream, sync::Mutex};
use tokio_tungstenite::{
	MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message,
};
use tracing::{debug, info, warn};

use crate::{
	client::Client,
	error::{ClientError, Result},
};

/// Bound on how long the socket handshake may take.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(45);

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// A live socket connection to one database.
///
/// Handles are cheap to clone; every clone refers to the same
/// underlying socket. The owning [`Client`] keeps one clone in its
/// connection slot, so closing the session closes the connection.
///
/// The writer half is serialized internally, so concurrent `send`
/// calls from multiple tasks are safe; a blocked
/// [`receive`](Connection::receive) never blocks a send.
#[derive(Clone)]
pub struct Connection {
	inner: Arc<ConnectionInner>,
}

struct ConnectionInner {
	database: String,
	writer: Mutex<WsSink>,
	reader: Mutex<WsStream>,
	open: AtomicBool,
}

impl std::fmt::Debug for Connection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Connection")
			.field("database", &self.inner.database)
			.field("open", &self.is_open())
			.finish_non_exhaustive()
	}
}

impl Connection {
	fn new(database: String, writer: WsSink, reader: WsStream) -> Self {
		Self {
			inner: Arc::new(ConnectionInner {
				database,
				writer: Mutex::new(writer),
				reader: Mutex::new(reader),
				open: AtomicBool::new(true),
			}),
		}
	}

	/// The database address this connection is bound to.
	pub fn database(&self) -> &str {
		&self.inner.database
	}

	/// Whether the connection is still open.
	pub fn is_open(&self) -> bool {
		self.inner.open.load(Ordering::Acquire)
	}

	/// Send one message as a JSON text frame.
	pub async fn send<T: Serialize + ?Sized>(
		&self,
		message: &T,
	) -> Result<()> {
		if !self.is_open() {
			return Err(ClientError::NotConnected);
		}

		let text = serde_json::to_string(message)
			.map_err(ClientError::Encode)?;

		let mut writer = self.inner.writer.lock().await;
		writer.send(Message::Text(text.into()))
			.await
			.map_err(|e| ClientError::Transport(e.to_string()))
	}

	/// Receive the next message, waiting until one full JSON frame is
	/// available.
	///
	/// Control frames are answered by the transport and skipped here.
	/// Nothing is buffered beyond what the transport itself queues;
	/// callers needing a deadline impose one externally.
	pub async fn receive(&self) -> Result<Value> {
		if !self.is_open() {
			return Err(ClientError::NotConnected);
		}

		let mut reader = self.inner.reader.lock().await;
		loop {
			match reader.next().await {
				Some(Ok(Message::Text(text))) => {
					return serde_json::from_str(&text)
						.map_err(ClientError::Decode);
				}
				Some(Ok(Message::Binary(data))) => {
					return serde_json::from_slice(&data)
						.map_err(ClientError::Decode);
				}
				Some(Ok(Message::Close(_))) => {
					self.mark_closed();
					return Err(ClientError::Transport(
						"connection closed by server"
							.to_string(),
					));
				}
				Some(Ok(_)) => continue,
				Some(Err(e)) => {
					self.mark_closed();
					return Err(ClientError::Transport(
						e.to_string(),
					));
				}
				None => {
					self.mark_closed();
					return Err(ClientError::Transport(
						"connection closed".to_string(),
					));
				}
			}
		}
	}

	/// Close the connection. Idempotent; send and receive fail with
	/// [`ClientError::NotConnected`] afterwards.
	pub async fn close(&self) -> Result<()> {
		if self.inner.open.swap(false, Ordering::AcqRel) {
			let mut writer = self.inner.writer.lock().await;
			writer.send(Message::Close(None)).await.map_err(|e| {
				ClientError::Close(e.to_string())
			})?;
			debug!(database = %self.inner.database, "connection closed");
		}
		Ok(())
	}

	fn mark_closed(&self) {
		self.inner.open.store(false, Ordering::Release);
	}
}

impl Client {
	/// Open a persistent connection to a database.
	///
	/// Requires a token; the handshake carries it as a query
	/// parameter on the scheme-swapped variant of the base endpoint.
	/// Any connection previously held by this session is closed
	/// before the new one is installed, so the old socket is not
	/// leaked.
	pub async fn connect(&self, address: &str) -> Result<Connection> {
		let token = self.require_token()?;

		if self.is_closed() {
			return Err(ClientError::Connection(
				"session is closed".to_string(),
			));
		}

		let mut target = self.endpoint(&format!(
			"/v1/database/{address}/subscribe"
		))?;
		let scheme = match self.base_url.scheme() {
			"https" | "wss" => "wss",
			_ => "ws",
		};
		target.set_scheme(scheme).map_err(|()| {
			ClientError::Connection(format!(
				"cannot derive a socket scheme from {:?}",
				self.base_url.scheme()
			))
		})?;
		target.query_pairs_mut().append_pair("token", token);

		debug!(url = %target, "connecting");
		let (stream, _) = tokio::time::timeout(
			HANDSHAKE_TIMEOUT,
			connect_async(target.as_str()),
		)
		.await
		.map_err(|_| {
			ClientError::Connection("handshake timed out".to_string())
		})?
		.map_err(|e| ClientError::Connection(e.to_string()))?;

		let (writer, reader) = stream.split();
		let connection =
			Connection::new(address.to_string(), writer, reader);

		// Swap into the session slot, tearing down any previous
		// connection first.
		let mut slot = self.connection.lock().await;
		if let Some(previous) = slot.take() {
			if let Err(e) = previous.close().await {
				warn!(error = %e, "failed to close replaced connection");
			}
		}
		*slot = Some(connection.clone());

		info!(database = %address, "connected");
		Ok(connection)
	}

	/// Send a message on the session's connection.
	///
	/// Fails with [`ClientError::NotConnected`] when no connection
	/// has been opened or the session is closed.
	pub async fn send<T: Serialize + ?Sized>(
		&self,
		message: &T,
	) -> Result<()> {
		let connection = self
			.connection
			.lock()
			.await
			.clone()
			.ok_or(ClientError::NotConnected)?;
		connection.send(message).await
	}

	/// Receive the next message from the session's connection.
	pub async fn receive(&self) -> Result<Value> {
		let connection = self
			.connection
			.lock()
			.await
			.clone()
			.ok_or(ClientError::NotConnected)?;
		connection.receive().await
	}
}
