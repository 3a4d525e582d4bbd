// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON response document returned across the bridge.
//!
//! Empty and false fields are left out, so a bare success is `{"status":"ok"}`.

use serde::Serialize;
use tracing::warn;
use wabridge_core::{BridgeError, RunResult};
use wabridge_session::RunFailure;

/// Returned verbatim when a response cannot be serialized.
pub const FALLBACK_RESPONSE: &str = r#"{"status":"error","error":"failed to marshal result"}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub last_messages: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub requires_qr: bool,
}

impl Response {
    pub fn success(result: RunResult) -> Self {
        Self::with_result(Status::Ok, None, Some(result))
    }

    /// An error response, carrying whatever `partial` collected.
    pub fn failure(error: &BridgeError, partial: Option<RunResult>) -> Self {
        Self::with_result(Status::Error, Some(error.to_string()), partial)
    }

    /// An error response with a fixed message and nothing else.
    pub fn error_message(message: impl Into<String>) -> Self {
        Self::with_result(Status::Error, Some(message.into()), None)
    }

    pub fn from_outcome(outcome: Result<RunResult, RunFailure>) -> Self {
        match outcome {
            Ok(result) => Self::success(result),
            Err(failure) => Self::failure(&failure.error, failure.partial),
        }
    }

    fn with_result(status: Status, error: Option<String>, result: Option<RunResult>) -> Self {
        let result = result.unwrap_or_default();
        Self {
            status,
            error,
            message_id: result
                .message_id
                .map(|id| id.0)
                .filter(|id| !id.is_empty()),
            last_messages: result.last_messages,
            requires_qr: result.requires_qr,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Serializes the response, falling back to [`FALLBACK_RESPONSE`].
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            warn!(error = %e, "failed to encode response");
            FALLBACK_RESPONSE.to_string()
        })
    }
}
