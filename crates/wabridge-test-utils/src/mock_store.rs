// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory credential store and a recording pairing renderer.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use wabridge_core::{BridgeError, CredentialStore, Identity, PairingCodeRenderer};

/// A credential store that keeps its single identity in memory.
#[derive(Default)]
pub struct MemoryCredentialStore {
    identity: Mutex<Option<Identity>>,
    deletes: AtomicUsize,
    closed: AtomicBool,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `identity`.
    pub fn with_identity(identity: Identity) -> Self {
        Self {
            identity: Mutex::new(Some(identity)),
            ..Self::default()
        }
    }

    /// A store holding a paired identity for `account`.
    pub fn paired(account: &str, device_id: &str) -> Self {
        Self::with_identity(Identity {
            device_id: Some(device_id.to_string()),
            ..Identity::unpaired(account)
        })
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load_or_create_identity(&self, account: &str) -> Result<Identity, BridgeError> {
        let mut slot = self.identity.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slot.get_or_insert_with(|| Identity::unpaired(account)).clone())
    }

    async fn current_identity(&self) -> Result<Option<Identity>, BridgeError> {
        Ok(self.identity())
    }

    async fn delete_identity(&self) -> Result<(), BridgeError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        *self.identity.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    async fn mark_paired(&self, device_id: &str) -> Result<Identity, BridgeError> {
        let mut slot = self.identity.lock().unwrap_or_else(PoisonError::into_inner);
        let identity = slot
            .as_mut()
            .ok_or_else(|| BridgeError::storage("no identity to pair"))?;
        identity.device_id = Some(device_id.to_string());
        Ok(identity.clone())
    }

    async fn close(&self) -> Result<(), BridgeError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Captures every pairing code instead of drawing it.
#[derive(Default)]
pub struct RecordingRenderer {
    codes: Mutex<Vec<String>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn codes(&self) -> Vec<String> {
        self.codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PairingCodeRenderer for RecordingRenderer {
    fn render(&self, code: &str) -> Result<(), BridgeError> {
        self.codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(code.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_once_then_returns_stored() {
        let store = MemoryCredentialStore::new();
        let first = store.load_or_create_identity("+1 555 0100").await.unwrap();
        assert_eq!(first.account, "15550100");
        assert!(!first.is_paired());

        let again = store.load_or_create_identity("999").await.unwrap();
        assert_eq!(again, first);
    }

    #[tokio::test]
    async fn mark_paired_needs_identity() {
        let store = MemoryCredentialStore::new();
        assert!(store.mark_paired("dev").await.is_err());

        store.load_or_create_identity("1").await.unwrap();
        let paired = store.mark_paired("dev").await.unwrap();
        assert!(paired.is_paired());
        assert_eq!(store.identity().unwrap().device_id.as_deref(), Some("dev"));
    }

    #[tokio::test]
    async fn delete_and_close_are_observable() {
        let store = MemoryCredentialStore::paired("1", "dev");
        store.delete_identity().await.unwrap();
        store.close().await.unwrap();
        assert!(store.identity().is_none());
        assert_eq!(store.delete_count(), 1);
        assert!(store.is_closed());
    }
}
