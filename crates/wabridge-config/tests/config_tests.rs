// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the wabridge configuration system.

use wabridge_config::diagnostic::ConfigError;
use wabridge_config::{load_and_validate_str, load_config, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_bridge_config() {
    let toml = r#"
[session]
wait_before_send_ms = 250
default_listen_secs = 4.5
max_listen_secs = 60.0
pairing_timeout_secs = 30
default_read_limit = 3
retention_cap = 50

[storage]
database_uri = "file:/tmp/test.db?_foreign_keys=on"

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.session.wait_before_send_ms, 250);
    assert_eq!(config.session.default_listen_secs, 4.5);
    assert_eq!(config.session.max_listen_secs, 60.0);
    assert_eq!(config.session.pairing_timeout_secs, 30);
    assert_eq!(config.session.default_read_limit, 3);
    assert_eq!(config.session.retention_cap, 50);
    assert_eq!(
        config.storage.database_uri,
        "file:/tmp/test.db?_foreign_keys=on"
    );
    assert_eq!(config.logging.level, "debug");
}

/// Missing sections fall back to compiled defaults.
#[test]
fn partial_toml_keeps_defaults() {
    let config = load_config_from_str("[logging]\nlevel = \"warn\"\n").unwrap();
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.session.default_read_limit, 10);
    assert_eq!(config.session.wait_before_send_ms, 5_000);
}

/// Unknown keys produce an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_key_produces_suggestion() {
    let errors = load_and_validate_str("[session]\nretention_cpa = 5\n")
        .expect_err("should reject unknown field");

    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "retention_cpa");
            assert_eq!(suggestion.as_deref(), Some("retention_cap"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Wrong value types produce an InvalidType diagnostic naming the key path.
#[test]
fn wrong_type_produces_invalid_type() {
    let errors = load_and_validate_str("[session]\nretention_cap = \"lots\"\n")
        .expect_err("should reject string for integer");

    match &errors[0] {
        ConfigError::InvalidType { key, .. } => assert!(key.contains("retention_cap"), "{key}"),
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

/// Semantic validation runs after a successful load.
#[test]
fn semantic_validation_runs_after_load() {
    let errors = load_and_validate_str("[session]\nretention_cap = 0\n")
        .expect_err("zero cap should be rejected");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

/// Local file and `WABRIDGE_*` variables layer over defaults, env winning.
#[test]
fn env_overrides_local_file() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "wabridge.toml",
            "[session]\nretention_cap = 20\ndefault_read_limit = 4\n",
        )?;
        jail.set_env("WABRIDGE_SESSION_RETENTION_CAP", "42");
        jail.set_env("WABRIDGE_STORAGE_DATABASE_URI", "file:jail.db");
        jail.set_env("WABRIDGE_LOG", "trace");

        let config = load_config()?;
        assert_eq!(config.session.retention_cap, 42);
        assert_eq!(config.session.default_read_limit, 4);
        assert_eq!(config.storage.database_uri, "file:jail.db");
        Ok(())
    });
}
