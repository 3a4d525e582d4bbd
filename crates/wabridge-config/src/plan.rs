// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request parsing and normalization into a [`RunPlan`].
//!
//! Normalization is a pure function of the request and the deployment
//! defaults. It never touches the store or the network, so every
//! `BridgeError::Config` it returns is raised before any I/O.

use std::time::Duration;

use serde::Deserialize;
use wabridge_core::{BridgeError, ChatTarget};

use crate::model::{SessionConfig, secs_to_duration};

/// A request as the caller sent it. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunRequest {
    #[serde(default)]
    pub send_text: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub read_chat: Option<String>,
    #[serde(default)]
    pub read_limit: Option<i64>,
    #[serde(default)]
    pub listen_seconds: Option<f64>,
    #[serde(default)]
    pub show_qr: Option<bool>,
    #[serde(default)]
    pub force_relink: Option<bool>,
    /// Ingest messages sent from this account too.
    #[serde(default)]
    pub include_self: Option<bool>,
}

impl RunRequest {
    /// Parses a payload that is either a JSON object or bare outbound text.
    ///
    /// Bare text is sent to the bridge's own account, the way a bare-text call
    /// always behaved. An empty payload is an empty request.
    pub fn parse(payload: &str, account: &str) -> Result<Self, BridgeError> {
        let trimmed = payload.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(value @ serde_json::Value::Object(_)) => serde_json::from_value(value)
                .map_err(|e| BridgeError::Config(format!("invalid request: {e}"))),
            _ => Ok(Self {
                send_text: Some(payload.to_string()),
                recipient: Some(account.to_string()),
                ..Self::default()
            }),
        }
    }
}

/// Outbound half of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPlan {
    pub target: ChatTarget,
    pub text: String,
}

/// Listening half of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenPlan {
    pub target: ChatTarget,
    /// Stop early once this many distinct messages arrived. `0` means no count target.
    pub limit: usize,
    /// How long to listen. `Duration::ZERO` means wait for the count target only.
    pub duration: Duration,
}

/// Fully resolved, immutable configuration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub send: Option<OutboundPlan>,
    pub listen: Option<ListenPlan>,
    pub show_qr: bool,
    pub force_relink: bool,
    pub include_self: bool,
}

impl RunPlan {
    /// Parses and normalizes a payload in one step.
    pub fn from_payload(
        payload: &str,
        account: &str,
        session: &SessionConfig,
    ) -> Result<Self, BridgeError> {
        normalize(RunRequest::parse(payload, account)?, session)
    }

    /// The count target and snapshot size (`0` when not listening or unbounded).
    pub fn read_limit(&self) -> usize {
        self.listen.as_ref().map_or(0, |l| l.limit)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolves every optional field and validates cross-field constraints.
pub fn normalize(request: RunRequest, session: &SessionConfig) -> Result<RunPlan, BridgeError> {
    let recipient = non_blank(request.recipient.as_deref());

    let send = match request.send_text.filter(|t| !t.trim().is_empty()) {
        Some(text) => {
            let raw = recipient.ok_or_else(|| BridgeError::Config("recipient required".into()))?;
            let target = ChatTarget::normalize(raw)
                .ok_or_else(|| BridgeError::Config(format!("invalid recipient: {raw}")))?;
            Some(OutboundPlan { target, text })
        }
        None => None,
    };

    let read_chat = non_blank(request.read_chat.as_deref()).or(recipient);

    let limit_set = request.read_limit.is_some();
    let limit = usize::try_from(request.read_limit.unwrap_or(0).max(0)).unwrap_or(usize::MAX);
    let duration_set = request.listen_seconds.is_some();
    let duration = secs_to_duration(request.listen_seconds.unwrap_or(0.0));

    let listening = read_chat.is_some() || limit > 0 || !duration.is_zero();
    let show_qr = request.show_qr.unwrap_or(false);
    let force_relink = request.force_relink.unwrap_or(false);

    if send.is_none() && !listening && !show_qr && !force_relink {
        return Err(BridgeError::Config("nothing to do".into()));
    }

    let listen = if listening {
        let raw = read_chat.ok_or_else(|| BridgeError::Config("read target required".into()))?;
        let target = ChatTarget::normalize(raw)
            .ok_or_else(|| BridgeError::Config(format!("invalid read chat: {raw}")))?;

        let duration = if duration_set {
            duration.min(session.max_listen())
        } else {
            session.default_listen()
        };
        let limit = if limit_set {
            limit
        } else {
            session.default_read_limit
        };

        Some(ListenPlan {
            target,
            limit,
            duration,
        })
    } else {
        None
    };

    Ok(RunPlan {
        send,
        listen,
        show_qr,
        force_relink,
        include_self: request.include_self.unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(payload: &str) -> Result<RunPlan, BridgeError> {
        RunPlan::from_payload(payload, "15550100", &SessionConfig::default())
    }

    fn config_message(result: Result<RunPlan, BridgeError>) -> String {
        match result {
            Err(BridgeError::Config(message)) => message,
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn send_without_recipient_is_rejected() {
        assert_eq!(
            config_message(plan(r#"{"send_text":"hi"}"#)),
            "recipient required"
        );
    }

    #[test]
    fn empty_request_has_nothing_to_do() {
        assert_eq!(config_message(plan("{}")), "nothing to do");
        assert_eq!(config_message(plan("   ")), "nothing to do");
    }

    #[test]
    fn negative_limit_clamps_and_listening_gets_default_duration() {
        let plan = plan(r#"{"recipient":"123","read_limit":-5}"#).unwrap();
        let listen = plan.listen.expect("listening should be active");
        assert_eq!(listen.limit, 0);
        assert_eq!(listen.duration, Duration::from_secs(10));
        assert_eq!(listen.target.to_string(), "123@s.whatsapp.net");
        assert!(plan.send.is_none());
    }

    #[test]
    fn read_chat_defaults_to_recipient_with_default_count() {
        let plan = plan(r#"{"send_text":"hi","recipient":"5551234"}"#).unwrap();
        let send = plan.send.as_ref().unwrap();
        assert_eq!(send.text, "hi");
        let listen = plan.listen.as_ref().unwrap();
        assert_eq!(listen.target, send.target);
        assert_eq!(listen.limit, 10);
        assert_eq!(plan.read_limit(), 10);
    }

    #[test]
    fn explicit_read_chat_overrides_recipient() {
        let plan =
            plan(r#"{"send_text":"hi","recipient":"5551234","read_chat":"999@g.us"}"#).unwrap();
        assert_eq!(plan.listen.unwrap().target.to_string(), "999@g.us");
    }

    #[test]
    fn explicit_duration_keeps_default_count() {
        let plan = plan(r#"{"read_chat":"123","listen_seconds":30}"#).unwrap();
        let listen = plan.listen.unwrap();
        assert_eq!(listen.limit, 10);
        assert_eq!(listen.duration, Duration::from_secs(30));
    }

    #[test]
    fn explicit_zero_limit_means_no_count_target() {
        let plan = plan(r#"{"read_chat":"123","read_limit":0,"listen_seconds":2.5}"#).unwrap();
        let listen = plan.listen.unwrap();
        assert_eq!(listen.limit, 0);
        assert_eq!(listen.duration, Duration::from_millis(2500));
    }

    #[test]
    fn explicit_duration_is_clamped_to_ceiling() {
        let plan = plan(r#"{"read_chat":"123","listen_seconds":100000}"#).unwrap();
        assert_eq!(plan.listen.unwrap().duration, Duration::from_secs(300));
    }

    #[test]
    fn huge_duration_saturates_to_ceiling() {
        let plan = plan(r#"{"read_chat":"123","listen_seconds":1e20}"#).unwrap();
        assert_eq!(plan.listen.unwrap().duration, Duration::from_secs(300));
        assert_eq!(
            config_message(super::RunPlan::from_payload(
                r#"{"listen_seconds":1e20}"#,
                "15550100",
                &SessionConfig::default()
            )),
            "read target required"
        );
    }

    #[test]
    fn positive_limit_without_target_needs_read_chat() {
        assert_eq!(
            config_message(plan(r#"{"read_limit":3}"#)),
            "read target required"
        );
        assert_eq!(
            config_message(plan(r#"{"listen_seconds":3}"#)),
            "read target required"
        );
    }

    #[test]
    fn pairing_only_plans_are_accepted() {
        let plan = plan(r#"{"show_qr":true}"#).unwrap();
        assert!(plan.show_qr);
        assert!(plan.listen.is_none());
        assert!(plan.send.is_none());

        let plan = super::normalize(
            RunRequest {
                force_relink: Some(true),
                ..RunRequest::default()
            },
            &SessionConfig::default(),
        )
        .unwrap();
        assert!(plan.force_relink);
    }

    #[test]
    fn bare_text_targets_own_account() {
        let plan = plan("hello there").unwrap();
        let send = plan.send.unwrap();
        assert_eq!(send.text, "hello there");
        assert_eq!(send.target.to_string(), "15550100@s.whatsapp.net");
        assert!(plan.listen.is_some());
    }

    #[test]
    fn non_object_json_is_bare_text() {
        let request = RunRequest::parse("42", "1").unwrap();
        assert_eq!(request.send_text.as_deref(), Some("42"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let message = config_message(plan(r#"{"read_chat":"1","listen_second":3}"#));
        assert!(message.starts_with("invalid request:"), "{message}");
    }

    #[test]
    fn unusable_recipient_is_reported() {
        assert_eq!(
            config_message(plan(r#"{"send_text":"x","recipient":"abc"}"#)),
            "invalid recipient: abc"
        );
    }

    #[test]
    fn include_self_defaults_off() {
        assert!(!plan(r#"{"read_chat":"1"}"#).unwrap().include_self);
        assert!(
            plan(r#"{"read_chat":"1","include_self":true}"#)
                .unwrap()
                .include_self
        );
    }
}
