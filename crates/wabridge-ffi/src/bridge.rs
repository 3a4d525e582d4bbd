// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request entry point shared by the Rust host API and the C ABI.

use std::sync::Arc;

use tracing::{debug, info};
use wabridge_config::{BridgeConfig, RunPlan};
use wabridge_core::{BackendFactory, BridgeError, PairingCodeRenderer};
use wabridge_session::{QrTerminalRenderer, SessionRunner, SessionSettings};
use wabridge_storage::SqliteCredentialStore;

use crate::response::Response;

/// Rejects a blank account phone before anything else happens.
pub fn require_account(account: &str) -> Result<&str, BridgeError> {
    let account = account.trim();
    if account.is_empty() {
        return Err(BridgeError::Config("phone number is required".into()));
    }
    Ok(account)
}

/// Runs requests against a backend with a fresh credential store per call.
pub struct Bridge {
    config: BridgeConfig,
    backends: Arc<dyn BackendFactory>,
    renderer: Arc<dyn PairingCodeRenderer>,
}

impl Bridge {
    /// A bridge that draws pairing codes on stderr.
    pub fn new(config: BridgeConfig, backends: Arc<dyn BackendFactory>) -> Self {
        Self {
            config,
            backends,
            renderer: Arc::new(QrTerminalRenderer::stderr()),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn PairingCodeRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Handles one request. `conn` falls back to the configured database URI
    /// when absent or blank. Request errors are reported before the store is
    /// opened.
    pub async fn run(&self, conn: Option<&str>, account: &str, payload: &str) -> Response {
        let account = match require_account(account) {
            Ok(account) => account,
            Err(e) => return Response::failure(&e, None),
        };
        let plan = match RunPlan::from_payload(payload, account, &self.config.session) {
            Ok(plan) => plan,
            Err(e) => return Response::failure(&e, None),
        };
        debug!(?plan, "request normalized");

        let uri = conn
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.config.storage.database_uri.as_str());
        let store = match SqliteCredentialStore::open(uri).await {
            Ok(store) => Arc::new(store),
            Err(e) => return Response::failure(&e, None),
        };
        info!(uri, "credential store ready");

        let mut runner = SessionRunner::new(
            SessionSettings::from(&self.config.session),
            store,
            Arc::clone(&self.backends),
            Arc::clone(&self.renderer),
        );
        Response::from_outcome(runner.run(account, &plan).await)
    }
}
