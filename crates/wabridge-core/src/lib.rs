// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the wabridge session bridge.
//!
//! This crate provides the trait seams (messaging backend, credential store,
//! pairing renderer), the error taxonomy, and the data types shared by the
//! config, session, storage, and FFI crates.

pub mod error;
pub mod events;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{BridgeError, ErrorKind};
pub use events::{BackendEvent, HistorySync, MessageContent, MessageEvent, PairingEvent};
pub use types::{ChatTarget, Identity, MessageId, MessageRecord, RunResult};

pub use traits::{BackendFactory, CredentialStore, MessagingBackend, PairingCodeRenderer};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_traits_are_object_safe() {
        // If any trait stops being dyn-compatible this test won't compile.
        fn _backend(_: &dyn MessagingBackend) {}
        fn _factory(_: &dyn BackendFactory) {}
        fn _store(_: &dyn CredentialStore) {}
        fn _renderer(_: &dyn PairingCodeRenderer) {}
    }

    #[test]
    fn pairing_event_kinds() {
        assert_eq!(PairingEvent::Code("x".into()).kind(), "code");
        assert_eq!(
            PairingEvent::Success {
                device_id: "d".into()
            }
            .kind(),
            "success"
        );
        assert_eq!(PairingEvent::Timeout.kind(), "timeout");
        assert_eq!(PairingEvent::Error("e".into()).kind(), "error");
    }

    #[test]
    fn message_event_deserializes_partial_payloads() {
        let event: MessageEvent = serde_json::from_str(
            r#"{"info":{"id":"ABC","chat":"5551234@s.whatsapp.net","is_from_me":false},
                "content":{"image":{"caption":"look"}}}"#,
        )
        .expect("partial payload should deserialize");
        assert_eq!(event.info.id, "ABC");
        assert!(event.info.timestamp.is_none());
        let caption = event
            .content
            .and_then(|c| c.image)
            .and_then(|i| i.caption);
        assert_eq!(caption.as_deref(), Some("look"));
    }

    #[test]
    fn default_run_result_is_empty() {
        let result = RunResult::default();
        assert!(result.last_messages.is_empty());
        assert!(result.message_id.is_none());
        assert!(!result.requires_qr);
    }
}
