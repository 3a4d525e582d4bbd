// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging backend for deterministic testing.
//!
//! `MockBackend` implements `MessagingBackend` with scripted pairing events,
//! injectable inbound events, optional echo replies, and captured outbound
//! messages for assertion in tests. History payloads are JSON-encoded
//! [`MessageEvent`]s.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;

use wabridge_core::events::{HistoryMessage, MessageInfo};
use wabridge_core::{
    BackendEvent, BackendFactory, BridgeError, ChatTarget, Identity, MessageContent, MessageEvent,
    MessageId, MessagingBackend, PairingEvent,
};

type Subscribers = Arc<Mutex<Vec<mpsc::UnboundedSender<BackendEvent>>>>;

fn deliver(subscribers: &Subscribers, event: &BackendEvent) {
    let mut subs = subscribers.lock().unwrap_or_else(PoisonError::into_inner);
    subs.retain(|tx| tx.send(event.clone()).is_ok());
}

/// Builds an inbound text message for `chat`, timestamped now.
pub fn inbound_message(id: &str, chat: &str, sender: &str, text: &str) -> MessageEvent {
    MessageEvent {
        info: MessageInfo {
            id: id.to_string(),
            chat: chat.to_string(),
            sender: sender.to_string(),
            push_name: None,
            is_from_me: false,
            timestamp: Some(Utc::now()),
        },
        content: Some(MessageContent::text(text)),
    }
}

/// A scripted messaging backend.
pub struct MockBackend {
    subscribers: Subscribers,
    sent: Mutex<Vec<(ChatTarget, String)>>,
    pairing_script: Vec<PairingEvent>,
    hold_pairing_open: bool,
    /// Keeps a held-open pairing stream alive for the backend's lifetime.
    pairing_tx: Mutex<Option<mpsc::Sender<PairingEvent>>>,
    on_connect: Vec<BackendEvent>,
    echo: Option<(String, Duration)>,
    fail_connect: bool,
    fail_send: bool,
    connected: AtomicBool,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
}

impl MockBackend {
    /// A backend that connects, accepts every send, and emits nothing.
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            sent: Mutex::new(Vec::new()),
            pairing_script: Vec::new(),
            hold_pairing_open: false,
            pairing_tx: Mutex::new(None),
            on_connect: Vec::new(),
            echo: None,
            fail_connect: false,
            fail_send: false,
            connected: AtomicBool::new(false),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
        }
    }

    /// Pairing events delivered, in order, by `pairing_events()`. The stream
    /// closes after the last one.
    pub fn with_pairing_script(mut self, events: Vec<PairingEvent>) -> Self {
        self.pairing_script = events;
        self
    }

    /// Leaves the pairing stream open after the script, so only the runner's
    /// pairing timeout can end it.
    pub fn with_pairing_held_open(mut self) -> Self {
        self.hold_pairing_open = true;
        self
    }

    /// Events emitted to subscribers as soon as `connect()` succeeds.
    pub fn with_events_on_connect(mut self, events: Vec<BackendEvent>) -> Self {
        self.on_connect = events;
        self
    }

    /// After every successful send, the recipient answers with `text` once
    /// `delay` has elapsed.
    pub fn with_echo(mut self, text: impl Into<String>, delay: Duration) -> Self {
        self.echo = Some((text.into(), delay));
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    /// Delivers `event` to every current subscriber.
    pub fn emit(&self, event: BackendEvent) {
        deliver(&self.subscribers, &event);
    }

    /// Encodes `event` the way `parse_history_message` expects it.
    pub fn history_message(event: &MessageEvent) -> HistoryMessage {
        HistoryMessage {
            payload: serde_json::to_vec(event).unwrap_or_default(),
        }
    }

    /// Every `(target, text)` passed to a successful `send_text`.
    pub fn sent_messages(&self) -> Vec<(ChatTarget, String)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagingBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<BackendEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    async fn pairing_events(&self) -> Result<mpsc::Receiver<PairingEvent>, BridgeError> {
        let (tx, rx) = mpsc::channel(self.pairing_script.len().max(1));
        for event in &self.pairing_script {
            tx.send(event.clone())
                .await
                .map_err(|e| BridgeError::Internal(format!("pairing stream: {e}")))?;
        }
        if self.hold_pairing_open {
            *self.pairing_tx.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        }
        Ok(rx)
    }

    async fn connect(&self) -> Result<(), BridgeError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect {
            return Err(BridgeError::connect("mock connection refused"));
        }
        self.connected.store(true, Ordering::SeqCst);
        for event in &self.on_connect {
            deliver(&self.subscribers, event);
        }
        Ok(())
    }

    async fn disconnect(&self) {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
    }

    async fn send_text(&self, target: &ChatTarget, text: &str) -> Result<MessageId, BridgeError> {
        if self.fail_send {
            return Err(BridgeError::send("mock send rejected"));
        }
        if !self.is_connected() {
            return Err(BridgeError::send("not connected"));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((target.clone(), text.to_string()));

        if let Some((reply, delay)) = self.echo.clone() {
            let subscribers = Arc::clone(&self.subscribers);
            let chat = target.to_string();
            let sender = target.user().to_string();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let id = format!("mock-echo-{}", uuid::Uuid::new_v4());
                let event = inbound_message(&id, &chat, &sender, &reply);
                deliver(&subscribers, &BackendEvent::Message(Box::new(event)));
            });
        }

        Ok(MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4())))
    }

    fn parse_history_message(
        &self,
        _chat: &ChatTarget,
        message: &HistoryMessage,
    ) -> Result<MessageEvent, BridgeError> {
        serde_json::from_slice(&message.payload)
            .map_err(|e| BridgeError::RecordConversion(e.to_string()))
    }
}

/// Hands out one shared [`MockBackend`] and records who asked for it.
pub struct MockBackendFactory {
    backend: Arc<MockBackend>,
    identities: Mutex<Vec<Identity>>,
}

impl MockBackendFactory {
    pub fn new(backend: Arc<MockBackend>) -> Self {
        Self {
            backend,
            identities: Mutex::new(Vec::new()),
        }
    }

    /// Identities passed to `create`, oldest first.
    pub fn created_for(&self) -> Vec<Identity> {
        self.identities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl BackendFactory for MockBackendFactory {
    async fn create(&self, identity: &Identity) -> Result<Arc<dyn MessagingBackend>, BridgeError> {
        self.identities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(identity.clone());
        let backend: Arc<dyn MessagingBackend> = self.backend.clone();
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ChatTarget {
        ChatTarget::normalize("5551234").unwrap()
    }

    #[tokio::test]
    async fn send_requires_connection_and_captures_text() {
        let backend = MockBackend::new();
        assert!(backend.send_text(&target(), "early").await.is_err());

        backend.connect().await.unwrap();
        let id = backend.send_text(&target(), "hello").await.unwrap();
        assert!(id.0.starts_with("mock-msg-"));
        assert_eq!(backend.sent_messages(), vec![(target(), "hello".to_string())]);
    }

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let backend = MockBackend::new();
        let mut rx = backend.subscribe();
        let event = inbound_message("1", "5551234@s.whatsapp.net", "5551234", "hi");
        backend.emit(BackendEvent::Message(Box::new(event)));

        match rx.recv().await.unwrap() {
            BackendEvent::Message(m) => assert_eq!(m.info.id, "1"),
            other => panic!("expected message, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn echo_arrives_after_delay() {
        let backend = MockBackend::new().with_echo("pong", Duration::from_secs(1));
        let mut rx = backend.subscribe();
        backend.connect().await.unwrap();
        backend.send_text(&target(), "ping").await.unwrap();

        match rx.recv().await.unwrap() {
            BackendEvent::Message(m) => {
                assert_eq!(m.info.chat, "5551234@s.whatsapp.net");
                assert_eq!(m.content.unwrap().conversation.as_deref(), Some("pong"));
            }
            other => panic!("expected echo, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn pairing_script_closes_stream() {
        let backend = MockBackend::new().with_pairing_script(vec![
            PairingEvent::Code("code-1".into()),
            PairingEvent::Success {
                device_id: "dev".into(),
            },
        ]);
        let mut rx = backend.pairing_events().await.unwrap();
        assert_eq!(rx.recv().await.unwrap().kind(), "code");
        assert_eq!(rx.recv().await.unwrap().kind(), "success");
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn history_payload_round_trips_and_garbage_fails() {
        let backend = MockBackend::new();
        let event = inbound_message("h1", "5551234@s.whatsapp.net", "5551234", "old");
        let parsed = backend
            .parse_history_message(&target(), &MockBackend::history_message(&event))
            .unwrap();
        assert_eq!(parsed.info.id, "h1");

        let err = backend
            .parse_history_message(
                &target(),
                &HistoryMessage {
                    payload: b"{".to_vec(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, BridgeError::RecordConversion(_)));
    }
}
