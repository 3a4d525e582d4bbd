// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as positive durations and non-empty store locations.

use crate::diagnostic::ConfigError;
use crate::model::BridgeConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or every collected error
/// (does not fail fast).
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let session = &config.session;

    if !session.default_listen_secs.is_finite() || session.default_listen_secs <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "session.default_listen_secs must be a positive number, got {}",
                session.default_listen_secs
            ),
        });
    }

    if !session.max_listen_secs.is_finite() || session.max_listen_secs <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "session.max_listen_secs must be a positive number, got {}",
                session.max_listen_secs
            ),
        });
    } else if session.max_listen_secs < session.default_listen_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "session.max_listen_secs ({}) must not be below session.default_listen_secs ({})",
                session.max_listen_secs, session.default_listen_secs
            ),
        });
    }

    if session.pairing_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "session.pairing_timeout_secs must be at least 1".to_string(),
        });
    }

    if session.default_read_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "session.default_read_limit must be at least 1".to_string(),
        });
    }

    if session.retention_cap == 0 {
        errors.push(ConfigError::Validation {
            message: "session.retention_cap must be at least 1".to_string(),
        });
    }

    if config.storage.database_uri.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_uri must not be empty".to_string(),
        });
    }

    if config.logging.level.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "logging.level must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&BridgeConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = BridgeConfig::default();
        config.session.default_listen_secs = 0.0;
        config.session.retention_cap = 0;
        config.storage.database_uri = "  ".into();

        let errors = validate_config(&config).expect_err("should fail");
        assert_eq!(errors.len(), 3, "{errors:?}");
    }

    #[test]
    fn ceiling_below_default_listen_is_rejected() {
        let mut config = BridgeConfig::default();
        config.session.default_listen_secs = 30.0;
        config.session.max_listen_secs = 20.0;

        let errors = validate_config(&config).expect_err("should fail");
        assert!(
            errors[0].to_string().contains("max_listen_secs"),
            "{errors:?}"
        );
    }
}
