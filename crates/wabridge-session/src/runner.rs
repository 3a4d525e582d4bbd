// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drives one run from identity resolution to teardown.
//!
//! The runner is the only place that sequences the adapters. It owns the
//! collector for the duration of the run, and it always releases what it
//! acquired: the backend is disconnected on every path once created, the
//! credential store is closed on every path, and the ingest task is aborted
//! before the result is returned.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use wabridge_config::model::SessionConfig;
use wabridge_config::{ListenPlan, RunPlan};
use wabridge_core::types::normalize_account;
use wabridge_core::{
    BackendFactory, BridgeError, CredentialStore, Identity, MessagingBackend, PairingCodeRenderer,
    PairingEvent, RunResult,
};

use crate::collector::MessageCollector;
use crate::ingest::Ingestor;
use crate::record::RecordFactory;
use crate::state::{RunState, RunStateMachine};

/// Timing and retention knobs of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Pause between connecting and the first command.
    pub wait_before_send: Duration,
    /// Upper bound on any listen window.
    pub max_listen: Duration,
    /// Upper bound on the pairing phase.
    pub pairing_timeout: Duration,
    /// Maximum number of records the collector retains.
    pub retention_cap: usize,
}

impl From<&SessionConfig> for SessionSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            wait_before_send: config.wait_before_send(),
            max_listen: config.max_listen(),
            pairing_timeout: config.pairing_timeout(),
            retention_cap: config.retention_cap,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

/// A failed run. `partial` carries what was collected when the failure
/// happened after the session became active.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct RunFailure {
    pub error: BridgeError,
    pub partial: Option<RunResult>,
}

impl From<BridgeError> for RunFailure {
    fn from(error: BridgeError) -> Self {
        Self {
            error,
            partial: None,
        }
    }
}

fn as_connect_error(err: BridgeError) -> BridgeError {
    match err {
        err @ BridgeError::Connect { .. } => err,
        other => BridgeError::Connect {
            message: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}

fn as_send_error(err: BridgeError) -> BridgeError {
    match err {
        err @ BridgeError::Send { .. } => err,
        other => BridgeError::Send {
            message: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}

/// Resources acquired by a run, released exactly once.
///
/// The normal path awaits [`Teardown::release`]. If the run future is dropped
/// first, `Drop` aborts the ingest task and finishes the release on the
/// current runtime.
struct Teardown {
    store: Arc<dyn CredentialStore>,
    backend: Option<Arc<dyn MessagingBackend>>,
    ingest: Option<JoinHandle<()>>,
    released: bool,
}

impl Teardown {
    fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            backend: None,
            ingest: None,
            released: false,
        }
    }

    async fn release(mut self) {
        if let Some(backend) = self.backend.take() {
            info!(backend = backend.name(), "disconnecting");
            backend.disconnect().await;
        }
        if let Some(handle) = self.ingest.take() {
            handle.abort();
        }
        close_store(self.store.as_ref()).await;
        self.released = true;
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        if let Some(handle) = self.ingest.take() {
            handle.abort();
        }
        if self.released {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("run dropped outside a runtime, backend left connected");
            return;
        };
        warn!("run cancelled, releasing backend and credential store");
        let backend = self.backend.take();
        let store = Arc::clone(&self.store);
        runtime.spawn(async move {
            if let Some(backend) = backend {
                backend.disconnect().await;
            }
            close_store(store.as_ref()).await;
        });
    }
}

async fn close_store(store: &dyn CredentialStore) {
    if let Err(e) = store.close().await {
        warn!(error = %e, "failed to close credential store");
    }
}

/// Executes a single [`RunPlan`] against injected adapters.
///
/// A runner is good for one run; a second call fails with an internal error.
pub struct SessionRunner {
    settings: SessionSettings,
    store: Arc<dyn CredentialStore>,
    backends: Arc<dyn BackendFactory>,
    renderer: Arc<dyn PairingCodeRenderer>,
    machine: RunStateMachine,
}

impl SessionRunner {
    pub fn new(
        settings: SessionSettings,
        store: Arc<dyn CredentialStore>,
        backends: Arc<dyn BackendFactory>,
        renderer: Arc<dyn PairingCodeRenderer>,
    ) -> Self {
        Self {
            settings,
            store,
            backends,
            renderer,
            machine: RunStateMachine::default(),
        }
    }

    pub fn state(&self) -> RunState {
        self.machine.state()
    }

    /// Runs `plan` for `account`. The credential store is closed before this
    /// returns, whatever the outcome. Dropping the returned future releases
    /// the backend and the store in a detached task.
    pub async fn run(&mut self, account: &str, plan: &RunPlan) -> Result<RunResult, RunFailure> {
        let mut teardown = Teardown::new(Arc::clone(&self.store));
        let outcome = self.drive(account, plan, &mut teardown).await;
        teardown.release().await;

        let outcome = outcome.and_then(|result| {
            self.machine.advance(RunState::Done)?;
            Ok(result)
        });
        match &outcome {
            Ok(_) => info!("run finished"),
            Err(failure) => {
                self.machine.fail();
                warn!(error = %failure.error, kind = %failure.error.kind(), "run failed");
            }
        }
        outcome
    }

    async fn drive(
        &mut self,
        account: &str,
        plan: &RunPlan,
        teardown: &mut Teardown,
    ) -> Result<RunResult, RunFailure> {
        let identity = self.resolve_identity(account, plan.force_relink).await?;
        self.machine.advance(RunState::IdentityResolved)?;
        info!(
            account = %identity.account,
            paired = identity.is_paired(),
            "identity resolved"
        );

        let backend = self.backends.create(&identity).await?;
        teardown.backend = Some(Arc::clone(&backend));
        let collector = Arc::new(MessageCollector::new(
            self.settings.retention_cap,
            plan.read_limit(),
        ));

        // Subscribe before connecting so no early history batch is missed.
        teardown.ingest = plan.listen.as_ref().map(|listen| {
            Ingestor::new(
                Arc::clone(&backend),
                Arc::clone(&collector),
                RecordFactory::new(plan.include_self),
                listen.target.clone(),
            )
            .spawn(backend.subscribe())
        });

        self.session(backend.as_ref(), plan, &collector, !identity.is_paired())
            .await
    }

    async fn resolve_identity(
        &self,
        account: &str,
        force_relink: bool,
    ) -> Result<Identity, BridgeError> {
        match self.store.current_identity().await? {
            Some(stored) if force_relink => {
                info!(stored = %stored.account, requested = %normalize_account(account), "relinking device");
                self.store.delete_identity().await?;
            }
            Some(stored) if !stored.matches_account(account) => {
                return Err(BridgeError::IdentityMismatch {
                    stored: stored.account,
                    requested: normalize_account(account),
                });
            }
            _ => {}
        }
        self.store.load_or_create_identity(account).await
    }

    async fn session(
        &mut self,
        backend: &dyn MessagingBackend,
        plan: &RunPlan,
        collector: &MessageCollector,
        requires_qr: bool,
    ) -> Result<RunResult, RunFailure> {
        if requires_qr {
            self.pair(backend, plan.show_qr).await?;
        } else {
            self.machine.advance(RunState::Connected)?;
            backend.connect().await.map_err(as_connect_error)?;
            info!(backend = backend.name(), "connected");
        }

        info!(
            seconds = self.settings.wait_before_send.as_secs_f64(),
            "waiting for session to stabilize"
        );
        tokio::time::sleep(self.settings.wait_before_send).await;
        self.machine.advance(RunState::Active)?;
        info!(collected = collector.len(), "messages collected before send");

        let mut message_id = None;
        let mut send_error = None;
        if let Some(outbound) = &plan.send {
            info!(to = %outbound.target, "sending message");
            match backend.send_text(&outbound.target, &outbound.text).await {
                Ok(id) => {
                    info!(id = %id, to = %outbound.target, "message sent");
                    message_id = Some(id);
                }
                Err(e) => {
                    warn!(error = %e, to = %outbound.target, "send failed");
                    send_error = Some(as_send_error(e));
                }
            }
        }

        if let Some(listen) = &plan.listen {
            self.listen(collector, listen).await;
        }

        self.machine.advance(RunState::Closing)?;
        if plan.listen.is_some() && collector.is_empty() {
            info!("no messages collected");
        }
        let result = RunResult {
            last_messages: collector.snapshot(plan.read_limit()),
            message_id,
            requires_qr,
        };
        match send_error {
            None => Ok(result),
            Some(error) => Err(RunFailure {
                error,
                partial: Some(result),
            }),
        }
    }

    async fn pair(&mut self, backend: &dyn MessagingBackend, show_qr: bool) -> Result<(), BridgeError> {
        self.machine.advance(RunState::Pairing)?;
        let mut events = backend.pairing_events().await.map_err(as_connect_error)?;
        backend.connect().await.map_err(as_connect_error)?;
        info!(backend = backend.name(), "connected, waiting for device pairing");

        let store = Arc::clone(&self.store);
        let renderer = Arc::clone(&self.renderer);
        let pairing = async move {
            while let Some(event) = events.recv().await {
                match event {
                    PairingEvent::Code(code) if show_qr => {
                        if let Err(e) = renderer.render(&code) {
                            warn!(error = %e, "failed to render pairing code");
                        }
                    }
                    PairingEvent::Success { device_id } => {
                        let identity = store.mark_paired(&device_id).await?;
                        info!(account = %identity.account, "device paired");
                    }
                    PairingEvent::Timeout => {
                        return Err(BridgeError::connect("pairing code expired"));
                    }
                    PairingEvent::Error(message) => {
                        return Err(BridgeError::connect(format!("pairing failed: {message}")));
                    }
                    other => info!(event = other.kind(), "pairing event"),
                }
            }
            debug!("pairing stream closed");
            Ok::<(), BridgeError>(())
        };

        let limit = self.settings.pairing_timeout;
        tokio::time::timeout(limit, pairing)
            .await
            .map_err(|_| BridgeError::Connect {
                message: format!("pairing not completed within {}s", limit.as_secs()),
                source: Some(Box::new(BridgeError::Timeout { duration: limit })),
            })?
    }

    /// Waits for the count target or the listen window, whichever comes first.
    async fn listen(&self, collector: &MessageCollector, listen: &ListenPlan) {
        let window = if listen.duration.is_zero() {
            self.settings.max_listen
        } else {
            listen.duration.min(self.settings.max_listen)
        };
        info!(
            chat = %listen.target,
            limit = listen.limit,
            seconds = window.as_secs_f64(),
            "listening for messages"
        );

        tokio::select! {
            () = collector.completed() => debug!("listen ended by message target"),
            () = tokio::time::sleep(window) => debug!("listen window elapsed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;
    use wabridge_test_utils::{
        MemoryCredentialStore, MockBackend, MockBackendFactory, RecordingRenderer,
    };

    use super::*;

    #[test]
    fn settings_follow_session_config() {
        let config = SessionConfig {
            wait_before_send_ms: 250,
            max_listen_secs: 30.0,
            pairing_timeout_secs: 12,
            retention_cap: 7,
            ..SessionConfig::default()
        };
        let settings = SessionSettings::from(&config);
        assert_eq!(settings.wait_before_send, Duration::from_millis(250));
        assert_eq!(settings.max_listen, Duration::from_secs(30));
        assert_eq!(settings.pairing_timeout, Duration::from_secs(12));
        assert_eq!(settings.retention_cap, 7);
    }

    #[test]
    fn errors_are_recategorized_once() {
        let wrapped = as_connect_error(BridgeError::Internal("socket".into()));
        assert!(matches!(wrapped, BridgeError::Connect { .. }));
        assert_eq!(wrapped.to_string(), "connect: internal error: socket");

        let kept = as_send_error(BridgeError::send("rejected"));
        assert_eq!(kept.to_string(), "send message: rejected");
    }

    #[test]
    fn failure_displays_inner_error() {
        let failure = RunFailure::from(BridgeError::Config("nothing to do".into()));
        assert_eq!(failure.to_string(), "nothing to do");
        assert!(failure.partial.is_none());
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn narrates_progress() {
        let backend = Arc::new(MockBackend::new());
        let mut runner = SessionRunner::new(
            SessionSettings::default(),
            Arc::new(MemoryCredentialStore::paired("15550100", "device-1")),
            Arc::new(MockBackendFactory::new(backend)),
            Arc::new(RecordingRenderer::new()),
        );
        let plan = RunPlan::from_payload(
            r#"{"send_text":"hi","recipient":"5551234"}"#,
            "15550100",
            &SessionConfig::default(),
        )
        .unwrap();

        runner.run("15550100", &plan).await.unwrap();

        assert!(logs_contain("identity resolved"));
        assert!(logs_contain("waiting for session to stabilize"));
        assert!(logs_contain("message sent"));
        assert!(logs_contain("no messages collected"));
        assert!(logs_contain("disconnecting"));
    }
}
