//! Tile decoding (C2).
//!
//! Decodes fetched DZI tile bytes into an RGB8 raster of the tile's natural
//! dimensions, which may be smaller than `tile_size + 2*overlap` at the
//! image's right/bottom edges.

use image::{ImageReader, RgbImage};
use std::io::Cursor;

use crate::error::RipError;

/// Decode one DZI source tile's encoded bytes into an owned RGB8 image.
pub fn decode(bytes: &[u8]) -> Result<RgbImage, RipError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RipError::DecodeFailed(e.to_string()))?;
    let image = reader.decode()?;
    Ok(image.into_rgb8())
}
