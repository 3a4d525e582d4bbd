// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./wabridge.toml` > `~/.config/wabridge/wabridge.toml` > `/etc/wabridge/wabridge.toml`
//! with environment variable overrides via `WABRIDGE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BridgeConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/wabridge/wabridge.toml`
/// 3. `~/.config/wabridge/wabridge.toml`
/// 4. `./wabridge.toml`
/// 5. `WABRIDGE_*` environment variables
pub fn load_config() -> Result<BridgeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<BridgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BridgeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BridgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BridgeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(BridgeConfig::default()))
        .merge(Toml::file("/etc/wabridge/wabridge.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("wabridge/wabridge.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("wabridge.toml"))
        .merge(env_provider())
}

/// Maps `WABRIDGE_SESSION_RETENTION_CAP` to `session.retention_cap`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys themselves
/// contain underscores. `WABRIDGE_LOG` is a log filter, not a config key.
fn env_provider() -> Env {
    Env::prefixed("WABRIDGE_").ignore(&["log"]).map(|key| {
        let mapped = key
            .as_str()
            .replacen("session_", "session.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}
