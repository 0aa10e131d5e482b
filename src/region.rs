//! Region Filler (C4).
//!
//! Fills one output tile's canvas by identifying the DZI source tiles that
//! cover it, acquiring each from the stripe cache pair or by fetch+decode,
//! and compositing them accounting for edge overlap (§4.4).

use image::{Rgb, RgbImage};

use crate::cancel::CancellationToken;
use crate::error::RipError;
use crate::source::TileFetcher;
use crate::tile::{StripeCachePair, decode};

pub struct RegionFiller<'a> {
    fetcher: &'a dyn TileFetcher,
    layer: usize,
    tile_size: u32,
    overlap: u32,
    col_count: u32,
    row_count: u32,
    output_tile: u32,
    cache: StripeCachePair,
}

impl<'a> RegionFiller<'a> {
    pub fn new(
        fetcher: &'a dyn TileFetcher,
        layer: usize,
        tile_size: u32,
        overlap: u32,
        col_count: u32,
        row_count: u32,
        output_tile: u32,
    ) -> Self {
        Self {
            fetcher,
            layer,
            tile_size,
            overlap,
            col_count,
            row_count,
            output_tile,
            cache: StripeCachePair::new(),
        }
    }

    /// Call once after the last output tile of a row has been filled, before
    /// starting the first tile of the next row.
    ///
    /// The horizontal (bottom-edge) carry cache accumulates deposits from
    /// every tile in a row and must not rotate until the whole row is done:
    /// the tile that consumes a given carry is one full row below the tile
    /// that produced it, and in row-major scan order every other tile in the
    /// producing row is visited first (§4.3, §9).
    pub fn finish_row(&mut self) {
        self.cache.rotate_horizontal();
    }

    /// Overwrite `canvas` with the base-image pixels of `[out_x, out_x+O) x
    /// [out_y, out_y+O)`, clipped to image bounds (outside remains zero).
    pub async fn fill(
        &mut self,
        out_x: u32,
        out_y: u32,
        canvas: &mut RgbImage,
        cancel: &CancellationToken,
    ) -> Result<(), RipError> {
        for pixel in canvas.pixels_mut() {
            *pixel = Rgb([0, 0, 0]);
        }

        let s = self.tile_size;
        let o = self.output_tile;

        let tx0 = out_x / s;
        let tx_count = ((out_x % s + o).div_ceil(s)).min(self.col_count - tx0);
        let ty0 = out_y / s;
        let ty_count = ((out_y % s + o).div_ceil(s)).min(self.row_count - ty0);

        for tx in tx0..tx0 + tx_count {
            for ty in ty0..ty0 + ty_count {
                cancel.check()?;

                let px = tx * s;
                let py = ty * s;

                let mut tile = if tx == tx0 {
                    self.cache.take_vertical(px, py)
                } else {
                    None
                };
                if tile.is_none() && ty == ty0 {
                    tile = self.cache.take_horizontal(px, py);
                }
                let tile = match tile {
                    Some(tile) => tile,
                    None => {
                        let bytes = self.fetcher.fetch(self.layer, tx, ty, cancel).await?;
                        decode(&bytes)?
                    }
                };

                let dx = px as i64 - out_x as i64 - self.overlap as i64;
                let dy = py as i64 - out_y as i64 - self.overlap as i64;
                blit(canvas, &tile, dx, dy);

                let right_edge = px + s > out_x + o;
                let bottom_edge = py + s > out_y + o;
                match (right_edge, bottom_edge) {
                    (true, true) => {
                        self.cache.deposit_horizontal(px, py, tile.clone());
                        self.cache.deposit_vertical(px, py, tile);
                    }
                    (true, false) => self.cache.deposit_vertical(px, py, tile),
                    (false, true) => self.cache.deposit_horizontal(px, py, tile),
                    (false, false) => {}
                }
            }
        }

        self.cache.rotate_vertical();
        Ok(())
    }
}

/// Copy `tile` onto `canvas` at offset `(dx, dy)`, clipping both source and
/// destination rectangles to their respective bounds.
pub(crate) fn blit(canvas: &mut RgbImage, tile: &RgbImage, dx: i64, dy: i64) {
    let (canvas_w, canvas_h) = (canvas.width() as i64, canvas.height() as i64);
    let (tile_w, tile_h) = (tile.width() as i64, tile.height() as i64);

    let src_x0 = (-dx).max(0);
    let src_y0 = (-dy).max(0);
    let dst_x0 = dx.max(0);
    let dst_y0 = dy.max(0);

    let w = (tile_w - src_x0).min(canvas_w - dst_x0);
    let h = (tile_h - src_y0).min(canvas_h - dst_y0);
    if w <= 0 || h <= 0 {
        return;
    }

    for y in 0..h {
        for x in 0..w {
            let pixel = *tile.get_pixel((src_x0 + x) as u32, (src_y0 + y) as u32);
            canvas.put_pixel((dst_x0 + x) as u32, (dst_y0 + y) as u32, pixel);
        }
    }
}
