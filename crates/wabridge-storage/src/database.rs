// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and migrations.
//!
//! Connection strings are SQLite URIs (`file:whatsapp.db?_foreign_keys=on`) or
//! plain paths. SQLite ignores query parameters it does not know, so the
//! underscore-prefixed driver options are read here and applied as PRAGMAs.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread.

use std::fmt::Display;

use rusqlite::OpenFlags;
use tracing::debug;
use wabridge_core::BridgeError;

use crate::migrations::run_migrations;

/// Convert a tokio-rusqlite error into `BridgeError::Storage`.
pub fn map_tr_err<E: Display>(e: tokio_rusqlite::Error<E>) -> BridgeError {
    BridgeError::storage(e.to_string())
}

/// PRAGMA statements requested through `_name=value` URI parameters.
pub fn uri_pragmas(uri: &str) -> Vec<String> {
    let Some((_, query)) = uri.split_once('?') else {
        return Vec::new();
    };

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter_map(|(key, value)| match key {
            "_foreign_keys" | "_fk" => Some(format!("PRAGMA foreign_keys = {};", flag(value)?)),
            "_busy_timeout" | "_timeout" => {
                let ms: u32 = value.parse().ok()?;
                Some(format!("PRAGMA busy_timeout = {ms};"))
            }
            "_synchronous" | "_sync" => {
                let mode = value.to_ascii_uppercase();
                matches!(mode.as_str(), "OFF" | "NORMAL" | "FULL" | "EXTRA")
                    .then(|| format!("PRAGMA synchronous = {mode};"))
            }
            _ => None,
        })
        .collect()
}

fn flag(value: &str) -> Option<&'static str> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Some("ON"),
        "0" | "off" | "false" | "no" => Some("OFF"),
        _ => None,
    }
}

/// Opens `uri`, applies connection PRAGMAs, and runs pending migrations.
pub async fn open_database(uri: &str) -> Result<tokio_rusqlite::Connection, BridgeError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = tokio_rusqlite::Connection::open_with_flags(uri, flags)
        .await
        .map_err(BridgeError::storage)?;

    let mut setup = String::from("PRAGMA journal_mode = WAL;");
    for pragma in uri_pragmas(uri) {
        setup.push_str(&pragma);
    }

    conn.call(move |conn| -> Result<(), rusqlite::Error> {
        conn.execute_batch(&setup)?;
        Ok(())
    })
    .await
    .map_err(map_tr_err)?;

    conn.call(|conn| -> Result<(), refinery::Error> { run_migrations(conn) })
        .await
        .map_err(map_tr_err)?;

    debug!(uri, "database opened and migrated");
    Ok(conn)
}
