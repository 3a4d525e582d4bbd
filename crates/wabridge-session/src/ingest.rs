// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feeds backend events into a [`MessageCollector`].
//!
//! Live messages and history-sync batches arrive on the same subscription
//! channel and are handled by one background task, so the collector sees
//! them in delivery order. Only messages from the read target are kept.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use wabridge_core::events::HistorySync;
use wabridge_core::{BackendEvent, ChatTarget, MessageEvent, MessagingBackend};

use crate::collector::{Admission, MessageCollector};
use crate::record::RecordFactory;

/// Routes backend events for one read target into the collector.
pub struct Ingestor {
    backend: Arc<dyn MessagingBackend>,
    collector: Arc<MessageCollector>,
    records: RecordFactory,
    target: ChatTarget,
}

impl Ingestor {
    pub fn new(
        backend: Arc<dyn MessagingBackend>,
        collector: Arc<MessageCollector>,
        records: RecordFactory,
        target: ChatTarget,
    ) -> Self {
        Self {
            backend,
            collector,
            records,
            target,
        }
    }

    /// Consumes `events` on a background task until the channel closes or
    /// the returned handle is aborted.
    pub fn spawn(self, mut events: mpsc::UnboundedReceiver<BackendEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                self.handle(event);
            }
            debug!("backend event stream closed");
        })
    }

    pub fn handle(&self, event: BackendEvent) {
        match event {
            BackendEvent::Message(message) => {
                self.ingest_live(&message);
            }
            BackendEvent::HistorySync(history) => {
                self.merge_history(&history);
            }
        }
    }

    /// Adds one live message. Returns whether it was stored.
    pub fn ingest_live(&self, event: &MessageEvent) -> bool {
        if !self.target.matches(&event.info.chat) {
            return false;
        }
        let Some(record) = self.records.build(Some(event)) else {
            return false;
        };
        let content = record.content.clone();
        match self.collector.add(record) {
            Admission::Duplicate => false,
            Admission::Accepted => {
                info!(message = %content, "new message");
                true
            }
            Admission::Completed => {
                info!(message = %content, "new message");
                info!(count = self.collector.len(), "message target reached");
                true
            }
        }
    }

    /// Merges the target conversation out of a history batch and returns the
    /// number of messages stored. Undecodable messages are skipped.
    pub fn merge_history(&self, history: &HistorySync) -> usize {
        let mut added = 0;
        for conversation in &history.conversations {
            let Some(chat) = ChatTarget::normalize(&conversation.id) else {
                warn!(id = %conversation.id, "skipping history conversation with invalid id");
                continue;
            };
            if chat != self.target {
                continue;
            }

            for message in &conversation.messages {
                let event = match self.backend.parse_history_message(&chat, message) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(chat = %chat, error = %e, "skipping undecodable history message");
                        continue;
                    }
                };
                let Some(record) = self.records.build(Some(&event)) else {
                    continue;
                };
                if self.collector.add(record).is_accepted() {
                    added += 1;
                }
            }
        }

        if added > 0 {
            info!(added, chat = %self.target, "history messages loaded");
        } else {
            debug!(chat = %self.target, "history sync had no new messages for target");
        }
        added
    }
}
