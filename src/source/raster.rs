use async_trait::async_trait;
use bytes::Bytes;
use image::RgbImage;
use std::io::Cursor;
use std::path::Path;

use super::TileFetcher;
use crate::cancel::CancellationToken;
use crate::error::FetchError;

/// A local raster (TIFF or any `image`-decodable file) treated as a
/// degenerate one-layer DZI with `tile_size=256, overlap=0` (§6). Tiles are
/// produced on demand by cropping the fully-decoded raster and re-encoding
/// the window as PNG, so they round-trip losslessly through [`crate::tile::decode`].
pub struct SingleRasterSource {
    image: RgbImage,
    tile_size: u32,
}

impl SingleRasterSource {
    pub const DEFAULT_TILE_SIZE: u32 = 256;

    pub async fn open(path: &Path) -> Result<Self, FetchError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let image = crate::tile::decode(&bytes).map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            image,
            tile_size: Self::DEFAULT_TILE_SIZE,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }
}

#[async_trait]
impl TileFetcher for SingleRasterSource {
    async fn fetch(
        &self,
        _layer: usize,
        col: u32,
        row: u32,
        cancel: &CancellationToken,
    ) -> Result<Bytes, FetchError> {
        cancel.check().map_err(|_| FetchError::Cancelled)?;

        let x0 = col * self.tile_size;
        let y0 = row * self.tile_size;
        if x0 >= self.image.width() || y0 >= self.image.height() {
            return Err(FetchError::NotFound(format!("{col}_{row}")));
        }

        let w = self.tile_size.min(self.image.width() - x0);
        let h = self.tile_size.min(self.image.height() - y0);
        let window = image::imageops::crop_imm(&self.image, x0, y0, w, h).to_image();

        let mut buf = Vec::new();
        window
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Bytes::from(buf))
    }
}
