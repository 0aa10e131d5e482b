//! JPEG+TIFF tile encoder (C7).
//!
//! Wraps the `image` crate's baseline JPEG encoder to turn one RGB8 canvas
//! into a self-contained tile stream at a configurable quality. Per the
//! resolved Open Question in §4.7, the shared `JPEGTables` metadata (see
//! [`super::quant`]) is informational: each tile stream still carries its
//! own quantization tables, since `image` does not expose shared/injectable
//! tables for abbreviated streams.

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::error::RipError;

/// Encode `canvas` as one JPEG tile at `quality` (`1..=100`).
pub fn encode_tile(canvas: &RgbImage, quality: u8) -> Result<Vec<u8>, RipError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .encode_image(canvas)
        .map_err(|e| RipError::EncodeFailed(e.to_string()))?;
    Ok(buf)
}
