// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging backend trait: the protocol client a session drives.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::BridgeError;
use crate::events::{BackendEvent, HistoryMessage, MessageEvent, PairingEvent};
use crate::types::{ChatTarget, Identity, MessageId};

/// A connected messaging protocol client.
///
/// The session runner owns exactly one backend per run. Inbound traffic is
/// pushed to subscribers from the backend's own tasks, so everything here must
/// be callable concurrently with event delivery.
#[async_trait]
pub trait MessagingBackend: Send + Sync + 'static {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Registers an event subscriber. Only events emitted after this call are delivered.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<BackendEvent>;

    /// Opens the pairing-code stream. Must be called before [`connect`](Self::connect)
    /// when the identity is not yet paired. The stream closes once pairing ends.
    async fn pairing_events(&self) -> Result<mpsc::Receiver<PairingEvent>, BridgeError>;

    /// Establishes the connection.
    async fn connect(&self) -> Result<(), BridgeError>;

    /// Closes the connection. Safe to call more than once.
    async fn disconnect(&self);

    /// Sends a plain text message and returns the backend message ID.
    async fn send_text(&self, target: &ChatTarget, text: &str) -> Result<MessageId, BridgeError>;

    /// Decodes one history-sync message belonging to `chat`.
    fn parse_history_message(
        &self,
        chat: &ChatTarget,
        message: &HistoryMessage,
    ) -> Result<MessageEvent, BridgeError>;
}

/// Creates a backend bound to a stored identity.
#[async_trait]
pub trait BackendFactory: Send + Sync + 'static {
    async fn create(&self, identity: &Identity) -> Result<Arc<dyn MessagingBackend>, BridgeError>;
}
