// Copyright (c) the spacetimedb-client authors 2025
// This file is licensed under the MIT, see license.md file

use reqwest::{
	StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
	client::Client,
	error::{ClientError, Result},
};

/// Metadata for a single database: its address and human-readable
/// name, both opaque to the client.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseInfo {
	pub address: String,
	pub name: String,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
	query: &'a str,
}

impl Client {
	/// Fetch metadata for a database.
	///
	/// The token is attached when present; the server accepts the
	/// request either way.
	pub async fn database_info(
		&self,
		address: &str,
	) -> Result<DatabaseInfo> {
		let url =
			self.endpoint(&format!("/v1/database/{address}"))?;

		let mut request = self.http.get(url);
		let auth = self.auth_header();
		if !auth.is_empty() {
			request = request.header(AUTHORIZATION, auth);
		}

		let response = request.send().await?;
		if response.status() != StatusCode::OK {
			return Err(ClientError::UnexpectedStatus(
				response.status().as_u16(),
			));
		}

		let body = response.text().await?;
		serde_json::from_str(&body).map_err(ClientError::Decode)
	}

	/// Execute a SQL query against a database.
	///
	/// The response is passed through as an arbitrary JSON value; its
	/// schema is owned by the server, not this client.
	pub async fn query(&self, address: &str, query: &str) -> Result<Value> {
		self.require_token()?;

		let body = serde_json::to_vec(&QueryRequest {
			query,
		})
		.map_err(ClientError::Encode)?;

		let url = self
			.endpoint(&format!("/v1/database/{address}/query"))?;
		let response = self
			.http
			.post(url)
			.header(AUTHORIZATION, self.auth_header())
			.header(CONTENT_TYPE, "application/json")
			.body(body)
			.send()
			.await?;

		if response.status() != StatusCode::OK {
			return Err(ClientError::UnexpectedStatus(
				response.status().as_u16(),
			));
		}

		let text = response.text().await?;
		serde_json::from_str(&text).map_err(ClientError::Decode)
	}
}
