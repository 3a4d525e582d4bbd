// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the CredentialStore trait.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tracing::debug;

use wabridge_core::types::normalize_account;
use wabridge_core::{BridgeError, CredentialStore, Identity};

use crate::database::{map_tr_err, open_database};

const SELECT_IDENTITY: &str = "SELECT account, device_id FROM identity WHERE id = 1";

fn read_identity(conn: &rusqlite::Connection) -> Result<Option<Identity>, rusqlite::Error> {
    conn.query_row(SELECT_IDENTITY, [], |row| {
        Ok(Identity {
            account: row.get(0)?,
            device_id: row.get(1)?,
        })
    })
    .optional()
}

/// Credential store persisting one identity per database.
///
/// The connection is released by [`CredentialStore::close`]; any call after
/// that fails with a storage error.
pub struct SqliteCredentialStore {
    uri: String,
    conn: Mutex<Option<tokio_rusqlite::Connection>>,
}

impl SqliteCredentialStore {
    /// Opens (creating if needed) the database behind `uri` and migrates it.
    pub async fn open(uri: &str) -> Result<Self, BridgeError> {
        let conn = open_database(uri).await?;
        debug!(uri, "credential store opened");
        Ok(Self {
            uri: uri.to_string(),
            conn: Mutex::new(Some(conn)),
        })
    }

    fn conn(&self) -> Result<tokio_rusqlite::Connection, BridgeError> {
        self.conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| BridgeError::storage("credential store is closed"))
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn load_or_create_identity(&self, account: &str) -> Result<Identity, BridgeError> {
        let account = normalize_account(account);
        let now = chrono::Utc::now().to_rfc3339();
        let identity = self
            .conn()?
            .call(move |conn| -> Result<Option<Identity>, rusqlite::Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO identity (id, account, device_id, created_at) \
                     VALUES (1, ?1, NULL, ?2)",
                    rusqlite::params![account, now],
                )?;
                read_identity(conn)
            })
            .await
            .map_err(map_tr_err)?;
        identity.ok_or_else(|| BridgeError::storage("identity row missing after insert"))
    }

    async fn current_identity(&self) -> Result<Option<Identity>, BridgeError> {
        self.conn()?
            .call(|conn| -> Result<Option<Identity>, rusqlite::Error> { read_identity(conn) })
            .await
            .map_err(map_tr_err)
    }

    async fn delete_identity(&self) -> Result<(), BridgeError> {
        let removed = self
            .conn()?
            .call(|conn| -> Result<usize, rusqlite::Error> {
                conn.execute("DELETE FROM identity", [])
            })
            .await
            .map_err(map_tr_err)?;
        debug!(removed, "identity deleted");
        Ok(())
    }

    async fn mark_paired(&self, device_id: &str) -> Result<Identity, BridgeError> {
        let device_id = device_id.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let identity = self
            .conn()?
            .call(move |conn| -> Result<Option<Identity>, rusqlite::Error> {
                conn.execute(
                    "UPDATE identity SET device_id = ?1, paired_at = ?2 WHERE id = 1",
                    rusqlite::params![device_id, now],
                )?;
                read_identity(conn)
            })
            .await
            .map_err(map_tr_err)?;
        identity.ok_or_else(|| BridgeError::storage("no identity to pair"))
    }

    async fn close(&self) -> Result<(), BridgeError> {
        let Some(conn) = self
            .conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return Ok(());
        };
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        debug!(uri = %self.uri, "credential store closed");
        Ok(())
    }
}
