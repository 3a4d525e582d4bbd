// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pairing code sink.

use crate::error::BridgeError;

/// Shows a pairing code to a human. Rendering failures are logged by the caller, never fatal.
pub trait PairingCodeRenderer: Send + Sync {
    fn render(&self, code: &str) -> Result<(), BridgeError>;
}
