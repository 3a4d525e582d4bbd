// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the wabridge session bridge.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Stable machine-readable category of a [`BridgeError`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    IdentityMismatch,
    Connect,
    Send,
    RecordConversion,
    Storage,
    Timeout,
    Internal,
}

/// The primary error type used across the bridge, its adapter traits, and the session runner.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed or contradictory request. Raised before any I/O happens.
    #[error("{0}")]
    Config(String),

    /// The credential store holds an identity for a different account.
    #[error("stored identity belongs to account {stored}, requested {requested}; relink required")]
    IdentityMismatch { stored: String, requested: String },

    /// Backend connection failed at the pairing or direct-connect stage.
    #[error("connect: {message}")]
    Connect {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Outbound send failed after a successful connection.
    #[error("send message: {message}")]
    Send {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// One backlog message could not be converted. Logged and skipped by the runner.
    #[error("convert history message: {0}")]
    RecordConversion(String),

    /// Credential store failure (open, query, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Shorthand for a connect failure without an underlying source.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a send failure without an underlying source.
    pub fn send(message: impl Into<String>) -> Self {
        Self::Send {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// The stable category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::IdentityMismatch { .. } => ErrorKind::IdentityMismatch,
            Self::Connect { .. } => ErrorKind::Connect,
            Self::Send { .. } => ErrorKind::Send,
            Self::RecordConversion(_) => ErrorKind::RecordConversion,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}
