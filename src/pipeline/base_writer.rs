//! Base-Layer Writer (C5).
//!
//! Iterates the output-tile grid row-major, driving the Region Filler for
//! each tile, JPEG-encoding the result, and emitting the base IFD (§4.5).

use image::RgbImage;

use crate::cancel::CancellationToken;
use crate::error::RipError;
use crate::geometry::{output_tile_grid, source_tile_count};
use crate::jpeg::encode_tile;
use crate::manifest::Manifest;
use crate::progress::ProgressSink;
use crate::region::RegionFiller;
use crate::source::TileFetcher;
use crate::tiff::{TileIfdParams, TiffWriter};

pub struct BaseLayerResult {
    pub col_count: u32,
    pub row_count: u32,
    pub total_bytes: u64,
    pub ifd_offset: u64,
}

/// Write the full-resolution IFD by re-tiling the DZI source tiles into a
/// regular `output_tile`-sized grid (invariant: `len(TileOffsets) ==
/// row_count * col_count` in row-major scan order).
#[allow(clippy::too_many_arguments)]
pub async fn write_base_layer(
    writer: &mut TiffWriter,
    fetcher: &dyn TileFetcher,
    manifest: &Manifest,
    base_layer: usize,
    output_tile: u32,
    quality: u8,
    jpeg_tables: Option<Vec<u8>>,
    software: Option<String>,
    cancel: &CancellationToken,
    progress: &dyn ProgressSink,
) -> Result<BaseLayerResult, RipError> {
    let (col_count, row_count) = output_tile_grid(manifest.width, manifest.height, output_tile);
    let (src_col_count, src_row_count) =
        source_tile_count(manifest.width, manifest.height, manifest.tile_size);
    let total_tiles = u64::from(col_count) * u64::from(row_count);
    progress.start_base(total_tiles);

    let mut filler = RegionFiller::new(
        fetcher,
        base_layer,
        manifest.tile_size,
        manifest.overlap,
        src_col_count,
        src_row_count,
        output_tile,
    );

    let mut canvas = RgbImage::new(output_tile, output_tile);
    let mut tile_offsets = Vec::with_capacity(total_tiles as usize);
    let mut tile_byte_counts = Vec::with_capacity(total_tiles as usize);
    let mut done = 0u64;
    let mut total_bytes = 0u64;

    for row in 0..row_count {
        for col in 0..col_count {
            cancel.check()?;
            let out_x = col * output_tile;
            let out_y = row * output_tile;

            filler.fill(out_x, out_y, &mut canvas, cancel).await?;
            let bytes = encode_tile(&canvas, quality)?;
            let (offset, len) = writer.append_tile(&bytes).await?;

            tile_offsets.push(offset);
            tile_byte_counts.push(len);
            total_bytes += len;
            done += 1;
            progress.base_progress(done, total_tiles);
        }
        filler.finish_row();
    }

    let params = TileIfdParams {
        reduced_resolution: false,
        image_width: manifest.width,
        image_length: manifest.height,
        tile_width: output_tile,
        tile_length: output_tile,
        tile_offsets,
        tile_byte_counts,
        jpeg_tables,
        software,
    };
    let ifd_offset = writer.write_ifd(&params).await?;
    writer.flush().await?;

    progress.complete_base(total_tiles, total_bytes);
    Ok(BaseLayerResult {
        col_count,
        row_count,
        total_bytes,
        ifd_offset,
    })
}
