// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Requests through the host API against a real SQLite store and a mock backend.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use wabridge_config::BridgeConfig;
use wabridge_core::PairingEvent;
use wabridge_ffi::{Bridge, Status};
use wabridge_test_utils::{MockBackend, MockBackendFactory, RecordingRenderer};

const ACCOUNT: &str = "15550100";

struct Fixture {
    dir: TempDir,
    backend: Arc<MockBackend>,
    renderer: Arc<RecordingRenderer>,
    bridge: Bridge,
}

impl Fixture {
    fn new(backend: MockBackend) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BridgeConfig::default();
        config.session.wait_before_send_ms = 0;
        config.session.default_listen_secs = 1.0;
        config.storage.database_uri = format!(
            "file:{}?_foreign_keys=on",
            dir.path().join("default.db").display()
        );

        let backend = Arc::new(backend);
        let renderer = Arc::new(RecordingRenderer::new());
        let bridge = Bridge::new(config, Arc::new(MockBackendFactory::new(Arc::clone(&backend))))
            .with_renderer(renderer.clone());
        Self {
            dir,
            backend,
            renderer,
            bridge,
        }
    }

    fn db_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn uri(&self, name: &str) -> String {
        format!("file:{}?_foreign_keys=on", self.db_path(name).display())
    }
}

fn pairing_backend() -> MockBackend {
    MockBackend::new()
        .with_pairing_script(vec![
            PairingEvent::Code("code-1".into()),
            PairingEvent::Success {
                device_id: "device-1".into(),
            },
        ])
        .with_echo("pong", Duration::from_millis(50))
}

#[tokio::test]
async fn first_run_pairs_then_later_runs_reuse_identity() {
    let fx = Fixture::new(pairing_backend());
    let uri = fx.uri("wa.db");
    let payload = r#"{"send_text":"hi","recipient":"5551234","read_limit":1,"listen_seconds":5,"show_qr":true}"#;

    let first = fx.bridge.run(Some(&uri), ACCOUNT, payload).await;
    assert_eq!(first.status, Status::Ok, "{first:?}");
    assert!(first.requires_qr);
    assert!(first.message_id.is_some());
    assert_eq!(first.last_messages.len(), 1);
    assert_eq!(fx.renderer.codes(), vec!["code-1".to_string()]);

    let second = fx.bridge.run(Some(&uri), ACCOUNT, payload).await;
    assert_eq!(second.status, Status::Ok, "{second:?}");
    assert!(!second.requires_qr);
    assert!(!second.encode().contains("requires_qr"));
    assert_eq!(fx.backend.sent_messages().len(), 2);
}

#[tokio::test]
async fn other_account_on_same_database_is_refused() {
    let fx = Fixture::new(pairing_backend());
    let uri = fx.uri("wa.db");

    let first = fx.bridge.run(Some(&uri), ACCOUNT, r#"{"show_qr":true}"#).await;
    assert!(first.is_ok(), "{first:?}");

    let other = fx.bridge.run(Some(&uri), "15559999", r#"{"show_qr":true}"#).await;
    assert_eq!(other.status, Status::Error);
    assert!(other.error.as_deref().unwrap().contains("relink required"));

    let relinked = fx
        .bridge
        .run(Some(&uri), "15559999", r#"{"force_relink":true}"#)
        .await;
    assert!(relinked.is_ok(), "{relinked:?}");
    assert!(relinked.requires_qr);
}

#[tokio::test]
async fn invalid_request_touches_no_storage() {
    let fx = Fixture::new(MockBackend::new());
    let uri = fx.uri("never.db");

    let response = fx.bridge.run(Some(&uri), ACCOUNT, r#"{"send_text":"hi"}"#).await;
    assert_eq!(
        response.encode(),
        r#"{"status":"error","error":"recipient required"}"#
    );
    assert!(!fx.db_path("never.db").exists());
    assert_eq!(fx.backend.connect_calls(), 0);
}

#[tokio::test]
async fn blank_connection_uses_configured_database() {
    let fx = Fixture::new(pairing_backend());

    let response = fx.bridge.run(Some("  "), ACCOUNT, r#"{"show_qr":true}"#).await;
    assert!(response.is_ok(), "{response:?}");
    assert!(fx.db_path("default.db").exists());
}

#[tokio::test]
async fn bare_text_is_sent_to_own_account() {
    let fx = Fixture::new(pairing_backend());
    let uri = fx.uri("wa.db");

    let response = fx.bridge.run(Some(&uri), ACCOUNT, "note to self").await;
    assert!(response.is_ok(), "{response:?}");
    let sent = fx.backend.sent_messages();
    assert_eq!(sent[0].0.to_string(), "15550100@s.whatsapp.net");
    assert_eq!(sent[0].1, "note to self");
}
