// Copyright (c) the spacetimedb-client authors 2025
// This file is licensed under the MIT, see license.md file

mod connection;

pub use connection::Connection;
