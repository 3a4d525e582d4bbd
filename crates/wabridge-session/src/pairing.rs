// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering of device pairing codes.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use qrcode::render::unicode::Dense1x2;
use qrcode::{EcLevel, QrCode};
use wabridge_core::{BridgeError, PairingCodeRenderer};

/// Draws pairing codes as half-block QR codes on a text stream.
///
/// Colors are inverted so the code scans on dark terminal backgrounds.
pub struct QrTerminalRenderer<W> {
    out: Mutex<W>,
}

impl QrTerminalRenderer<io::Stderr> {
    /// Renders to standard error, leaving stdout to the caller.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> QrTerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Encodes `code` as a low error-correction QR code in unicode half blocks.
pub fn render_qr(code: &str) -> Result<String, BridgeError> {
    let qr = QrCode::with_error_correction_level(code.as_bytes(), EcLevel::L)
        .map_err(|e| BridgeError::Internal(format!("encode pairing code: {e}")))?;
    Ok(qr
        .render::<Dense1x2>()
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .quiet_zone(true)
        .build())
}

impl<W: Write + Send> PairingCodeRenderer for QrTerminalRenderer<W> {
    fn render(&self, code: &str) -> Result<(), BridgeError> {
        let image = render_qr(code)?;
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{image}")
            .and_then(|()| out.flush())
            .map_err(|e| BridgeError::Internal(format!("write pairing code: {e}")))
    }
}
