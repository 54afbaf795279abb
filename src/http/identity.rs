// Copyright (c) the spacetimedb-client authors 2025
// This file is licensed under the MIT, see license.md file

use reqwest::{StatusCode, header::AUTHORIZATION};
use serde::Deserialize;
use tracing::debug;

use crate::{
	client::Client,
	error::{ClientError, Result},
};

/// An identity issued by the server: an identifier plus the bearer
/// token that proves ownership of it. Both are opaque strings.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityRecord {
	pub identity: String,
	pub token: String,
}

#[derive(Deserialize)]
struct DatabasesResponse {
	addresses: Vec<String>,
}

impl Client {
	/// Create a new identity.
	///
	/// The request is unauthenticated; the returned record carries
	/// the token to use for subsequent authenticated calls.
	pub async fn create_identity(&self) -> Result<IdentityRecord> {
		let url = self.endpoint("/v1/identity")?;

		let response = self.http.post(url).send().await?;
		if response.status() != StatusCode::OK {
			return Err(ClientError::UnexpectedStatus(
				response.status().as_u16(),
			));
		}

		let body = response.text().await?;
		let record: IdentityRecord = serde_json::from_str(&body)
			.map_err(ClientError::Decode)?;
		debug!(identity = %record.identity, "identity created");
		Ok(record)
	}

	/// Verify that the configured token owns the given identity.
	///
	/// Success is an empty `204 No Content` response.
	pub async fn verify_identity(&self, identity: &str) -> Result<()> {
		self.require_token()?;

		let url = self
			.endpoint(&format!("/v1/identity/{identity}/verify"))?;
		let response = self
			.http
			.get(url)
			.header(AUTHORIZATION, self.auth_header())
			.send()
			.await?;

		match response.status() {
			StatusCode::NO_CONTENT => Ok(()),
			status => Err(ClientError::UnexpectedStatus(
				status.as_u16(),
			)),
		}
	}

	/// List the addresses of the databases owned by an identity.
	///
	/// Order is preserved exactly as returned by the server.
	pub async fn databases(&self, identity: &str) -> Result<Vec<String>> {
		self.require_token()?;

		let url = self.endpoint(&format!(
			"/v1/identity/{identity}/databases"
		))?;
		let response = self
			.http
			.get(url)
			.header(AUTHORIZATION, self.auth_header())
			.send()
			.await?;

		if response.status() != StatusCode::OK {
			return Err(ClientError::UnexpectedStatus(
				response.status().as_u16(),
			));
		}

		let body = response.text().await?;
		let databases: DatabasesResponse = serde_json::from_str(&body)
			.map_err(ClientError::Decode)?;
		Ok(databases.addresses)
	}
}
