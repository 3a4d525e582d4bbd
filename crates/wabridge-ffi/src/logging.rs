// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing bootstrap for bridge callers.
//!
//! Output goes to stderr; stdout belongs to the host process.

use std::env;

use tracing_subscriber::EnvFilter;

/// Filter variable consulted after `RUST_LOG`.
pub const LOG_ENV: &str = "WABRIDGE_LOG";

fn default_filter(level: &str) -> String {
    format!("warn,wabridge={level}")
}

/// Picks the filter directives by precedence:
/// 1) `RUST_LOG`
/// 2) `WABRIDGE_LOG`
/// 3) the configured level for wabridge crates, `warn` for everything else
fn filter_directives(rust_log: Option<String>, app_log: Option<String>, level: &str) -> String {
    [rust_log, app_log]
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty() && EnvFilter::try_new(v).is_ok())
        .unwrap_or_else(|| default_filter(level))
}

/// Installs the global subscriber. Later calls are no-ops, as is a call made
/// when the host already installed its own subscriber.
pub fn init_tracing(level: &str) {
    let directives = filter_directives(env::var("RUST_LOG").ok(), env::var(LOG_ENV).ok(), level);
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_wins() {
        assert_eq!(
            filter_directives(Some("debug".into()), Some("trace".into()), "info"),
            "debug"
        );
    }

    #[test]
    fn app_variable_is_second() {
        assert_eq!(
            filter_directives(Some("  ".into()), Some("wabridge_session=trace".into()), "info"),
            "wabridge_session=trace"
        );
    }

    #[test]
    fn falls_back_to_configured_level() {
        assert_eq!(filter_directives(None, None, "debug"), "warn,wabridge=debug");
        assert_eq!(
            filter_directives(Some("wabridge=loud".into()), None, "info"),
            "warn,wabridge=info"
        );
    }

    #[test]
    fn init_is_idempotent() {
        init_tracing("info");
        init_tracing("debug");
    }
}
