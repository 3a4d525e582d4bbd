// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the wabridge session bridge.
//!
//! Two layers live here:
//! - deployment configuration (`BridgeConfig`): TOML files in the XDG hierarchy
//!   plus `WABRIDGE_*` environment overrides, validated after load;
//! - per-run plans (`RunPlan`): a request payload normalized against the
//!   deployment defaults.
//!
//! # Usage
//!
//! ```no_run
//! use wabridge_config::{load_and_validate, RunPlan};
//!
//! let config = load_and_validate().expect("config errors");
//! let plan = RunPlan::from_payload(r#"{"read_chat":"15551234"}"#, "15550100", &config.session)
//!     .expect("valid request");
//! assert!(plan.listen.is_some());
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod plan;
pub mod validation;

pub use diagnostic::{ConfigError, join_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::BridgeConfig;
pub use plan::{ListenPlan, OutboundPlan, RunPlan, RunRequest};

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid `BridgeConfig` or every diagnostic found.
pub fn load_and_validate() -> Result<BridgeConfig, Vec<ConfigError>> {
    finish(loader::load_config())
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<BridgeConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content))
}

#[allow(clippy::result_large_err)]
fn finish(loaded: Result<BridgeConfig, figment::Error>) -> Result<BridgeConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}
