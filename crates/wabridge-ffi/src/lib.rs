// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host-facing surface of the wabridge session bridge.
//!
//! Rust hosts call [`Bridge::run`] directly. Foreign hosts link the shared
//! library and use the C ABI (see `include/wabridge.h`):
//!
//! ```c
//! char *json = wa_run("file:whatsapp.db?_foreign_keys=on", "15550100",
//!                     "{\"read_chat\":\"5551234\",\"read_limit\":5}");
//! /* ... */
//! wa_free(json);
//! ```
//!
//! The messaging backend is supplied by the host through
//! [`register_backend_factory`] before the first `wa_run` call.

pub mod bridge;
pub mod ffi;
pub mod logging;
pub mod response;

pub use bridge::Bridge;
pub use ffi::{register_backend_factory, wa_free, wa_run};
pub use response::{FALLBACK_RESPONSE, Response, Status};
