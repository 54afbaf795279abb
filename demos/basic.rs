// Copyright (c) the spacetimedb-client authors 2025
// This file is licensed under the MIT, see license.md file

use std::{env, time::Duration};

use serde_json::json;
use spacetimedb_client::Client;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let base_url = env::var("SPACETIMEDB_URL")?;

	// Bootstrap: an unauthenticated client can only mint identities.
	let client = Client::new(&base_url)?;
	let record = client.create_identity().await?;
	println!("created identity {}", record.identity);

	// Rebuild the client with the issued credential.
	let client = Client::new(&base_url)?
		.with_token(record.token.clone())
		.with_identity(record.identity.clone());

	client.verify_identity(&record.identity).await?;
	println!("identity verified");

	let databases = client.databases(&record.identity).await?;
	println!("databases: {databases:?}");

	let Some(address) = databases.first() else {
		client.close().await?;
		return Ok(());
	};

	let info = client.database_info(address).await?;
	println!("connected database: {} ({})", info.name, info.address);

	let connection = client.connect(address).await?;
	connection
		.send(&json!({"type": "test", "data": "Hello, SpacetimeDB!"}))
		.await?;
	println!("sent test message");

	// Drain messages in the background until the session closes.
	let cancel = client.cancel_token();
	let receiver = tokio::spawn(async move {
		loop {
			tokio::select! {
				_ = cancel.cancelled() => break,
				message = connection.receive() => match message {
					Ok(message) => {
						println!("received: {message}")
					}
					Err(err) => {
						eprintln!("receive failed: {err}");
						break;
					}
				},
			}
		}
	});

	tokio::time::sleep(Duration::from_secs(5)).await;
	client.close().await?;
	receiver.await?;
	Ok(())
}
