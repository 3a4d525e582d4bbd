// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session orchestration for the wabridge bridge.
//!
//! The [`SessionRunner`] is the central coordinator that:
//! - Resolves (or relinks) the identity held by the credential store
//! - Pairs a new device or connects an already-paired one
//! - Sends the outbound message, if any
//! - Collects inbound and backlog messages for the read target until the
//!   count target or the listen window is reached
//! - Disconnects and reports a [`RunResult`](wabridge_core::RunResult)

pub mod collector;
pub mod ingest;
pub mod pairing;
pub mod record;
pub mod runner;
pub mod state;

pub use collector::{Admission, MessageCollector};
pub use pairing::QrTerminalRenderer;
pub use record::RecordFactory;
pub use runner::{RunFailure, SessionRunner, SessionSettings};
pub use state::RunState;
