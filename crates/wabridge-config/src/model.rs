// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the wabridge deployment.
//!
//! These are deployment-level knobs (defaults applied to requests, timing
//! budgets, store location). Per-run settings come from the request payload
//! and are resolved in [`crate::plan`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration. Every section is optional and defaults sensibly.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Session timing and request defaults.
    #[serde(default)]
    pub session: SessionConfig,

    /// Credential store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log filtering.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Session timing and the defaults applied while normalizing requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Stabilization delay after connecting, before any command is issued.
    #[serde(default = "default_wait_before_send_ms")]
    pub wait_before_send_ms: u64,

    /// Listen duration applied when listening is active but none was requested.
    #[serde(default = "default_listen_secs")]
    pub default_listen_secs: f64,

    /// Hard ceiling for any listen phase, including signal-only waits.
    #[serde(default = "default_max_listen_secs")]
    pub max_listen_secs: f64,

    /// How long to wait for the pairing-code stream to finish.
    #[serde(default = "default_pairing_timeout_secs")]
    pub pairing_timeout_secs: u64,

    /// Message count applied when listening is active but no limit was requested.
    #[serde(default = "default_read_limit")]
    pub default_read_limit: usize,

    /// Maximum number of messages held in memory during a run.
    #[serde(default = "default_retention_cap")]
    pub retention_cap: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wait_before_send_ms: default_wait_before_send_ms(),
            default_listen_secs: default_listen_secs(),
            max_listen_secs: default_max_listen_secs(),
            pairing_timeout_secs: default_pairing_timeout_secs(),
            default_read_limit: default_read_limit(),
            retention_cap: default_retention_cap(),
        }
    }
}

impl SessionConfig {
    pub fn wait_before_send(&self) -> Duration {
        Duration::from_millis(self.wait_before_send_ms)
    }

    pub fn default_listen(&self) -> Duration {
        secs_to_duration(self.default_listen_secs)
    }

    pub fn max_listen(&self) -> Duration {
        secs_to_duration(self.max_listen_secs)
    }

    pub fn pairing_timeout(&self) -> Duration {
        Duration::from_secs(self.pairing_timeout_secs)
    }
}

/// Converts fractional seconds, treating negative and non-finite values as
/// zero. Values too large for a `Duration` saturate.
pub fn secs_to_duration(secs: f64) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

fn default_wait_before_send_ms() -> u64 {
    5_000
}

fn default_listen_secs() -> f64 {
    10.0
}

fn default_max_listen_secs() -> f64 {
    300.0
}

fn default_pairing_timeout_secs() -> u64 {
    180
}

fn default_read_limit() -> usize {
    10
}

fn default_retention_cap() -> usize {
    500
}

/// Credential store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite URI used when the caller passes an empty connection string.
    #[serde(default = "default_database_uri")]
    pub database_uri: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_uri: default_database_uri(),
        }
    }
}

fn default_database_uri() -> String {
    "file:whatsapp.db?_foreign_keys=on".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive used when neither `RUST_LOG` nor `WABRIDGE_LOG` is set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
