// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the collaborators a session run depends on.
//!
//! Async traits use `#[async_trait]` so they stay object safe behind `Arc<dyn _>`.

pub mod backend;
pub mod credential;
pub mod renderer;

pub use backend::{BackendFactory, MessagingBackend};
pub use credential::CredentialStore;
pub use renderer::PairingCodeRenderer;
