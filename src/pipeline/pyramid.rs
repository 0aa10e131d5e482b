//! Reduced-Resolution Generator (C6).
//!
//! Reopens the output file for reading while it stays open for append,
//! repeatedly halving the previous IFD's resolution via 2x2 block averaging
//! until the shorter side drops below the threshold (§4.6).

use image::{Rgb, RgbImage};
use std::path::Path;

use crate::cancel::CancellationToken;
use crate::error::RipError;
use crate::geometry::{half_dimensions, output_tile_grid, pyramid_layer_count};
use crate::io::FileRangeReader;
use crate::jpeg::encode_tile;
use crate::progress::ProgressSink;
use crate::region::blit;
use crate::tiff::header::{ByteOrder, TiffHeader};
use crate::tiff::{TileIfdParams, TiffIfd, TiffWriter};

/// Area-preserving 2x downsample: each output pixel is the average of its
/// corresponding 2x2 source block (zero-padded input contributes a shorter
/// average at the image edges, matching the already-zero-padded canvas).
fn half_res(src: &RgbImage) -> RgbImage {
    let (w, h) = (src.width(), src.height());
    let (out_w, out_h) = (w.div_ceil(2).max(1), h.div_ceil(2).max(1));
    let mut out = RgbImage::new(out_w, out_h);

    for oy in 0..out_h {
        for ox in 0..out_w {
            let x0 = ox * 2;
            let y0 = oy * 2;
            let mut sum = [0u32; 3];
            let mut count = 0u32;
            for dy in 0..2 {
                for dx in 0..2 {
                    let x = x0 + dx;
                    let y = y0 + dy;
                    if x < w && y < h {
                        let p = src.get_pixel(x, y);
                        for c in 0..3 {
                            sum[c] += u32::from(p[c]);
                        }
                        count += 1;
                    }
                }
            }
            let count = count.max(1);
            out.put_pixel(
                ox,
                oy,
                Rgb([
                    (sum[0] / count) as u8,
                    (sum[1] / count) as u8,
                    (sum[2] / count) as u8,
                ]),
            );
        }
    }
    out
}

#[allow(clippy::too_many_arguments)]
pub async fn generate_pyramid(
    writer: &mut TiffWriter,
    output_path: &Path,
    base_ifd_offset: u64,
    base_width: u32,
    base_height: u32,
    output_tile: u32,
    is_bigtiff: bool,
    quality: u8,
    jpeg_tables: Option<Vec<u8>>,
    software: Option<String>,
    cancel: &CancellationToken,
    progress: &dyn ProgressSink,
) -> Result<(), RipError> {
    let layer_count = pyramid_layer_count(base_width, base_height, output_tile);
    progress.start_pyramid(layer_count);

    let header = TiffHeader {
        byte_order: ByteOrder::LittleEndian,
        is_bigtiff,
        first_ifd_offset: base_ifd_offset,
    };

    let mut current_ifd_offset = base_ifd_offset;
    let mut cur_w = base_width;
    let mut cur_h = base_height;
    let mut layer_index = 0usize;
    let step = output_tile * 2;

    while cur_w.min(cur_h) > output_tile && cur_w.min(cur_h) >= 32 {
        cancel.check()?;

        let file_reader = FileRangeReader::open(output_path).await?;
        let ifd = TiffIfd::read(&file_reader, &header, current_ifd_offset).await?;

        let (nw, nh) = half_dimensions(cur_w, cur_h);
        let (new_col_count, new_row_count) = output_tile_grid(nw, nh, output_tile);
        let total_tiles = u64::from(new_col_count) * u64::from(new_row_count);
        progress.start_layer(layer_index, total_tiles, nw, nh);

        let mut tile_offsets = Vec::with_capacity(total_tiles as usize);
        let mut tile_byte_counts = Vec::with_capacity(total_tiles as usize);
        let mut done = 0u64;

        let mut y = 0u32;
        while y < cur_h {
            let mut x = 0u32;
            while x < cur_w {
                cancel.check()?;

                let mut block = RgbImage::new(step, step);
                for pixel in block.pixels_mut() {
                    *pixel = Rgb([0, 0, 0]);
                }

                let base_col = x / output_tile;
                let base_row = y / output_tile;
                for dr in 0..2u32 {
                    for dc in 0..2u32 {
                        let col = base_col + dc;
                        let row = base_row + dr;
                        if col < ifd.col_count() && row < ifd.row_count() {
                            let tile = ifd.read_tile(&file_reader, col, row).await?;
                            blit(
                                &mut block,
                                &tile,
                                (dc * output_tile) as i64,
                                (dr * output_tile) as i64,
                            );
                        }
                    }
                }

                let downsampled = half_res(&block);
                let bytes = encode_tile(&downsampled, quality)?;
                let (offset, len) = writer.append_tile(&bytes).await?;
                tile_offsets.push(offset);
                tile_byte_counts.push(len);
                done += 1;
                progress.layer_progress(layer_index, done, total_tiles);

                x += step;
            }
            y += step;
        }

        let total_bytes: u64 = tile_byte_counts.iter().sum();
        let params = TileIfdParams {
            reduced_resolution: true,
            image_width: nw,
            image_length: nh,
            tile_width: output_tile,
            tile_length: output_tile,
            tile_offsets,
            tile_byte_counts,
            jpeg_tables: jpeg_tables.clone(),
            software: software.clone(),
        };
        current_ifd_offset = writer.write_ifd(&params).await?;
        writer.flush().await?;

        progress.complete_layer(layer_index, total_tiles, total_bytes);

        cur_w = nw;
        cur_h = nh;
        layer_index += 1;
    }

    progress.complete_pyramid(layer_index);
    Ok(())
}
