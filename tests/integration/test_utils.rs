//! Test utilities for integration tests.
//!
//! Builds synthetic on-disk DZI pyramids and small fixtures the pipeline
//! tests drive `dzrip`'s public API against.

use async_trait::async_trait;
use bytes::Bytes;
use dzrip::{CancellationToken, FetchError, TileFetcher};
use image::{Rgb, RgbImage};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn unique_temp_dir(label: &str) -> PathBuf {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("dzrip-it-{label}-{}-{n}", std::process::id()))
}

/// A distinct solid color per source-tile coordinate, so a tile read back
/// from the output pyramid can be matched to the column/row that produced it.
pub fn tile_color(col: u32, row: u32) -> Rgb<u8> {
    Rgb([
        ((col + 1) * 40) as u8,
        ((row + 1) * 40) as u8,
        ((col + row + 1) * 20) as u8,
    ])
}

/// Write a complete DZI pyramid level (manifest + one layer of tiles) to
/// `dir`, laid out exactly as [`dzrip::source::LocalDziSource`] expects:
/// `sample.dzi` alongside `sample_files/{layer}/{col}_{row}.{format}`.
/// Only the base (deepest) layer is populated; the pipeline only ever reads
/// tiles from that one layer.
pub async fn write_local_dzi(
    dir: &std::path::Path,
    width: u32,
    height: u32,
    tile_size: u32,
    quality: u8,
) -> PathBuf {
    tokio::fs::create_dir_all(dir).await.unwrap();

    let layer = dzrip::geometry::base_layer_index(width, height);
    let col_count = width.div_ceil(tile_size);
    let row_count = height.div_ceil(tile_size);
    let tiles_dir = dir.join("sample_files").join(layer.to_string());
    tokio::fs::create_dir_all(&tiles_dir).await.unwrap();

    for row in 0..row_count {
        for col in 0..col_count {
            let w = tile_size.min(width - col * tile_size);
            let h = tile_size.min(height - row * tile_size);
            let img = RgbImage::from_pixel(w, h, tile_color(col, row));
            let mut buf = Vec::new();
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
            encoder.encode_image(&img).unwrap();
            tokio::fs::write(tiles_dir.join(format!("{col}_{row}.jpg")), buf)
                .await
                .unwrap();
        }
    }

    let manifest_path = dir.join("sample.dzi");
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Image xmlns="http://schemas.microsoft.com/deepzoom/2008" TileSize="{tile_size}" Overlap="0" Format="jpg">
  <Size Width="{width}" Height="{height}" />
</Image>"#
    );
    tokio::fs::write(&manifest_path, xml).await.unwrap();
    manifest_path
}

/// In-memory [`TileFetcher`] that counts fetches per `(col, row)`, used to
/// verify the Region Filler's single-pass-fetch guarantee without touching
/// the filesystem.
pub struct CountingFetcher {
    tiles: HashMap<(u32, u32), RgbImage>,
    fetch_counts: Mutex<HashMap<(u32, u32), u32>>,
    total_fetches: AtomicUsize,
}

impl CountingFetcher {
    pub fn new(tiles: HashMap<(u32, u32), RgbImage>) -> Self {
        Self {
            tiles,
            fetch_counts: Mutex::new(HashMap::new()),
            total_fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self, col: u32, row: u32) -> u32 {
        *self
            .fetch_counts
            .lock()
            .unwrap()
            .get(&(col, row))
            .unwrap_or(&0)
    }

    pub fn total_fetches(&self) -> usize {
        self.total_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TileFetcher for CountingFetcher {
    async fn fetch(
        &self,
        _layer: usize,
        col: u32,
        row: u32,
        _cancel: &CancellationToken,
    ) -> Result<Bytes, FetchError> {
        self.total_fetches.fetch_add(1, Ordering::SeqCst);
        *self
            .fetch_counts
            .lock()
            .unwrap()
            .entry((col, row))
            .or_insert(0) += 1;

        let tile = self
            .tiles
            .get(&(col, row))
            .ok_or_else(|| FetchError::NotFound(format!("{col}_{row}")))?;
        let mut buf = Vec::new();
        tile.write_to(
            &mut std::io::Cursor::new(&mut buf),
            image::ImageFormat::Png,
        )
        .unwrap();
        Ok(Bytes::from(buf))
    }
}
