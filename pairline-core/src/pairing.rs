//! Pairing code rendering
//!
//! Pairing codes are rendered as PNG QR images and shipped as data URLs, the
//! form both the HTTP surface and the real-time channel hand to browsers.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Luma};
use qrcode::QrCode;

use crate::error::RenderError;

/// Prefix of every rendered pairing image
pub const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Smallest edge, in pixels, of a rendered code
const MIN_DIMENSION: u32 = 256;

/// Render a pairing code as a `data:image/png;base64,...` URL
///
/// Rendering is deterministic, so callers may re-render per request.
pub fn render_data_url(code: &str) -> Result<String, RenderError> {
    let qr = QrCode::new(code.as_bytes())?;
    let image = qr
        .render::<Luma<u8>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .build();

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    Ok(format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(png)))
}
