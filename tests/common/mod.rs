// Copyright (c) the spacetimedb-client authors 2025
// This file is licensed under the MIT, see license.md file

use std::sync::{Arc, Mutex};

use axum::{
	Json, Router,
	extract::Path,
	http::{HeaderMap, StatusCode},
	routing::{get, post},
};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::{
	Message,
	handshake::server::{Request, Response},
};

/// The token the stub server accepts.
pub const TOKEN: &str = "tok1";

/// Serve a router on an ephemeral port and return the base URL.
#[allow(dead_code)]
pub async fn serve(router: Router) -> String {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		axum::serve(listener, router).await.unwrap();
	});
	format!("http://{addr}")
}

/// A base URL whose port has no listener behind it.
#[allow(dead_code)]
pub async fn dead_endpoint() -> String {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	drop(listener);
	format!("http://{addr}")
}

/// The bearer header of a request, if any.
#[allow(dead_code)]
pub fn bearer(headers: &HeaderMap) -> Option<&str> {
	headers.get("authorization").and_then(|v| v.to_str().ok())
}

fn authorized(headers: &HeaderMap) -> bool {
	bearer(headers).is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

/// Stub covering the full HTTP surface: one identity, two databases.
#[allow(dead_code)]
pub fn stub_router() -> Router {
	Router::new()
		.route("/v1/identity", post(create_identity))
		.route("/v1/identity/{id}/verify", get(verify_identity))
		.route("/v1/identity/{id}/databases", get(databases))
		.route("/v1/database/{address}", get(database_info))
		.route("/v1/database/{address}/query", post(query))
}

async fn create_identity() -> Json<Value> {
	Json(json!({"identity": "id1", "token": TOKEN}))
}

async fn verify_identity(headers: HeaderMap) -> StatusCode {
	if authorized(&headers) {
		StatusCode::NO_CONTENT
	} else {
		StatusCode::UNAUTHORIZED
	}
}

async fn databases(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
	if !authorized(&headers) {
		return Err(StatusCode::UNAUTHORIZED);
	}
	Ok(Json(json!({"addresses": ["a", "b"]})))
}

async fn database_info(
	Path(address): Path<String>,
) -> Result<Json<Value>, StatusCode> {
	// Metadata lookups work with or without a token.
	Ok(Json(json!({"address": address, "name": "demo"})))
}

async fn query(
	Path(address): Path<String>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
	if !authorized(&headers) {
		return Err(StatusCode::UNAUTHORIZED);
	}
	let Some(query) = body.get("query").and_then(Value::as_str) else {
		return Err(StatusCode::BAD_REQUEST);
	};
	Ok(Json(json!([{
		"database": address,
		"query": query,
		"rows": [[1, "alice"], [2, "bob"]],
	}])))
}

/// Spawn a WebSocket echo server.
///
/// Returns the base HTTP URL plus a slot capturing the URI of the most
/// recent handshake, so tests can assert on path and query.
#[allow(dead_code)]
pub async fn serve_ws_echo() -> (String, Arc<Mutex<Option<String>>>) {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let seen = Arc::new(Mutex::new(None));
	let seen_by_server = Arc::clone(&seen);

	tokio::spawn(async move {
		while let Ok((stream, _)) = listener.accept().await {
			let seen = Arc::clone(&seen_by_server);
			tokio::spawn(async move {
				let callback = move |req: &Request,
				                     resp: Response| {
					*seen.lock().unwrap() =
						Some(req.uri().to_string());
					Ok(resp)
				};
				let ws = tokio_tungstenite::accept_hdr_async(
					stream, callback,
				)
				.await
				.unwrap();

				let (mut writer, mut reader) = ws.split();
				while let Some(Ok(message)) =
					reader.next().await
				{
					match message {
						Message::Text(_)
						| Message::Binary(_) => {
							if writer.send(message)
								.await
								.is_err()
							{
								break;
							}
						}
						Message::Close(_) => break,
						_ => {}
					}
				}
			});
		}
	});

	(format!("http://{addr}"), seen)
}

/// Spawn a WebSocket server that closes every connection right after
/// the handshake.
#[allow(dead_code)]
pub async fn serve_ws_slamming() -> String {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();

	tokio::spawn(async move {
		while let Ok((stream, _)) = listener.accept().await {
			tokio::spawn(async move {
				let mut ws =
					tokio_tungstenite::accept_async(stream)
						.await
						.unwrap();
				ws.send(Message::Close(None)).await.unwrap();
			});
		}
	});

	format!("http://{addr}")
}
