// Copyright (c) the spacetimedb-client authors 2025
// This file is licensed under the MIT, see license.md file

//! Minimal async client for SpacetimeDB.
//!
//! The crate is a thin adapter over the server's HTTP and WebSocket
//! surfaces. Identity management, database metadata and SQL queries are
//! single-shot HTTP request/response cycles; [`Client::connect`] opens a
//! persistent socket for streaming schemaless JSON messages in both
//! directions.
//!
//! Every operation is fallible and surfaces a [`ClientError`] describing
//! exactly what went wrong. Nothing is retried on the client's behalf.
//!
//! ```no_run
//! use spacetimedb_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! 	let client = Client::new("http://localhost:3000")?;
//! 	let record = client.create_identity().await?;
//!
//! 	// Rebuild the client with the issued credential.
//! 	let client = Client::new("http://localhost:3000")?
//! 		.with_token(record.token.clone())
//! 		.with_identity(record.identity.clone());
//!
//! 	client.verify_identity(&record.identity).await?;
//! 	for address in client.databases(&record.identity).await? {
//! 		println!("{address}");
//! 	}
//!
//! 	client.close().await?;
//! 	Ok(())
//! }
//! ```

mod client;
mod error;
mod http;
mod ws;

pub use client::Client;
pub use error::{ClientError, Result};
pub use http::{DatabaseInfo, IdentityRecord};
// Socket payloads are schemaless; both directions speak plain JSON values.
pub use serde_json::Value;
pub use ws::Connection;
