// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the wabridge session bridge.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`. The only persisted
//! state is the identity bound to a connection string.

pub mod credential;
pub mod database;
pub mod migrations;

pub use credential::SqliteCredentialStore;
pub use database::open_database;
