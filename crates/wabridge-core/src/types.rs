// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the session runner, the credential store, and backends.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server part used for bare phone-number addresses.
pub const DEFAULT_USER_SERVER: &str = "s.whatsapp.net";

/// Identifier assigned by the backend to a sent or received message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized conversation handle (`user@server`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatTarget {
    user: String,
    server: String,
}

impl ChatTarget {
    /// Normalizes a qualified address or a bare phone-number-like string.
    ///
    /// `user@server` keeps the user verbatim and lowercases the server. Anything
    /// without an `@` is reduced to its ASCII digits and placed on
    /// [`DEFAULT_USER_SERVER`]. Returns `None` when nothing usable remains.
    pub fn normalize(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some((user, server)) = raw.split_once('@') {
            let user = user.trim();
            if user.is_empty() {
                return None;
            }
            let server = server.trim().to_ascii_lowercase();
            let server = if server.is_empty() {
                DEFAULT_USER_SERVER.to_string()
            } else {
                server
            };
            return Some(Self {
                user: user.to_string(),
                server,
            });
        }

        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            None
        } else {
            Some(Self {
                user: digits,
                server: DEFAULT_USER_SERVER.to_string(),
            })
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// True when `raw` normalizes to this same target.
    pub fn matches(&self, raw: &str) -> bool {
        Self::normalize(raw).as_ref() == Some(self)
    }
}

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.server)
    }
}

/// Reduces an account phone to its digits so `+1 555-0100` and `15550100` compare equal.
pub fn normalize_account(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// The account bound to a credential store.
///
/// An identity is paired once the backend has linked a device to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub account: String,
    pub device_id: Option<String>,
}

impl Identity {
    /// A fresh, not yet paired identity for `account`.
    pub fn unpaired(account: &str) -> Self {
        Self {
            account: normalize_account(account),
            device_id: None,
        }
    }

    pub fn is_paired(&self) -> bool {
        self.device_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn matches_account(&self, account: &str) -> bool {
        normalize_account(&self.account) == normalize_account(account)
    }
}

/// One collected inbound message in display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// Dedup key: the backend message ID, or a composite fallback.
    pub key: String,
    pub timestamp: DateTime<Utc>,
    /// Fully formatted display line.
    pub content: String,
}

/// Outcome of one completed session run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub last_messages: Vec<String>,
    pub message_id: Option<MessageId>,
    pub requires_qr: bool,
}
