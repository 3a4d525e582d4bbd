// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! C ABI: `wa_run` and `wa_free`.
//!
//! Every string crossing the boundary is NUL-terminated UTF-8. Strings
//! returned by `wa_run` are owned by this library and must be released with
//! `wa_free`. Panics are caught and reported as error responses.

use std::ffi::{CStr, CString, c_char};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::{Arc, OnceLock};

use tracing::error;
use wabridge_config::{join_errors, load_and_validate};
use wabridge_core::BackendFactory;

use crate::bridge::{Bridge, require_account};
use crate::logging;
use crate::response::{FALLBACK_RESPONSE, Response};

static BACKENDS: OnceLock<Arc<dyn BackendFactory>> = OnceLock::new();

/// Installs the backend used by `wa_run`. Only the first registration takes
/// effect; returns `false` for every later call.
pub fn register_backend_factory(factory: Arc<dyn BackendFactory>) -> bool {
    BACKENDS.set(factory).is_ok()
}

/// Copies a C string, replacing invalid UTF-8. Null yields `None`.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for reads.
unsafe fn read_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the caller contract.
    let raw = unsafe { CStr::from_ptr(ptr) };
    Some(raw.to_string_lossy().into_owned())
}

fn into_c_string(json: String) -> *mut c_char {
    CString::new(json)
        .or_else(|_| CString::new(FALLBACK_RESPONSE))
        .map_or(ptr::null_mut(), CString::into_raw)
}

/// Handles one request with an explicit backend. The C entry point passes
/// the registered one.
pub(crate) fn handle_request(
    backends: Option<&Arc<dyn BackendFactory>>,
    conn: Option<&str>,
    account: &str,
    payload: &str,
) -> Response {
    if let Err(e) = require_account(account) {
        return Response::failure(&e, None);
    }
    let Some(backends) = backends else {
        return Response::error_message("no messaging backend registered");
    };
    let config = match load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            return Response::error_message(format!(
                "invalid configuration: {}",
                join_errors(&errors)
            ));
        }
    };
    logging::init_tracing(&config.logging.level);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => return Response::error_message(format!("internal error: start runtime: {e}")),
    };
    let bridge = Bridge::new(config, Arc::clone(backends));
    runtime.block_on(bridge.run(conn, account, payload))
}

/// Runs one request and returns a JSON response.
///
/// `conn` may be null or empty to use the configured database. `payload` may
/// be null, which is treated as an empty request.
///
/// # Safety
///
/// Each argument must be null or a valid NUL-terminated string that stays
/// alive for the duration of the call. The returned pointer must be freed
/// with [`wa_free`] exactly once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wa_run(
    conn: *const c_char,
    account_phone: *const c_char,
    payload: *const c_char,
) -> *mut c_char {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: forwarded from this function's contract.
        let (conn, account, payload) =
            unsafe { (read_c_str(conn), read_c_str(account_phone), read_c_str(payload)) };
        handle_request(
            BACKENDS.get(),
            conn.as_deref(),
            account.as_deref().unwrap_or_default(),
            payload.as_deref().unwrap_or_default(),
        )
        .encode()
    }));

    let json = outcome.unwrap_or_else(|_| {
        error!("request panicked");
        Response::error_message("internal error: request panicked").encode()
    });
    into_c_string(json)
}

/// Releases a string returned by [`wa_run`]. Null is ignored.
///
/// # Safety
///
/// `ptr` must be null or a pointer obtained from `wa_run` that has not been
/// freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wa_free(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: allocated by `CString::into_raw` in `wa_run`, freed once.
    drop(unsafe { CString::from_raw(ptr) });
}
