// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential store trait for the single paired identity of a connection string.

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::types::Identity;

/// Persistent storage of at most one identity.
///
/// A store is opened once per run and closed on every exit path by the runner.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Returns the stored identity, creating an unpaired one for `account` if none exists.
    async fn load_or_create_identity(&self, account: &str) -> Result<Identity, BridgeError>;

    /// Returns the stored identity, if any.
    async fn current_identity(&self) -> Result<Option<Identity>, BridgeError>;

    /// Removes the stored identity. A no-op when none exists.
    async fn delete_identity(&self) -> Result<(), BridgeError>;

    /// Records the device linked by a successful pairing.
    async fn mark_paired(&self, device_id: &str) -> Result<Identity, BridgeError>;

    /// Flushes and releases the store.
    async fn close(&self) -> Result<(), BridgeError>;
}
