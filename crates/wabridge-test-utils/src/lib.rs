// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for wabridge integration tests.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests without
//! a real messaging network or database.
//!
//! # Components
//!
//! - [`MockBackend`] - Scripted messaging backend with echo replies and event injection
//! - [`MockBackendFactory`] - Factory handing out a shared `MockBackend`
//! - [`MemoryCredentialStore`] - In-memory identity store
//! - [`RecordingRenderer`] - Pairing renderer that captures codes

pub mod mock_backend;
pub mod mock_store;

pub use mock_backend::{MockBackend, MockBackendFactory, inbound_message};
pub use mock_store::{MemoryCredentialStore, RecordingRenderer};
