//! Stripe cache pair (C3).
//!
//! Carries decoded source tiles from one output-tile iteration to the next
//! so each DZI tile is fetched/decoded at most twice (once in the common
//! case). The two caches rotate on different schedules because they carry
//! across different distances (§4.3, §9): the vertical (right-edge) carry
//! is only needed by the very next output tile (one column over, same
//! row), so it rotates once per output tile. The horizontal (bottom-edge)
//! carry is needed by the output tile one full row down, which in
//! row-major scan order is reached only after every other tile in the
//! current row has been processed — so it must accumulate deposits across
//! an entire output-tile row and rotate only at the row boundary, never
//! per-tile.
//!
//! The vertical cache expects only a handful of hits per output tile, so a
//! linear list is used for locality and minimal overhead. The horizontal
//! cache can hold an entire row of source tiles, so it is keyed by a packed
//! `(x<<32)|y` in a hashmap.

use image::RgbImage;
use std::collections::HashMap;

fn pack(x: u32, y: u32) -> u64 {
    (u64::from(x) << 32) | u64::from(y)
}

/// Right-edge carry cache: small, so a `Vec` scan beats hashing overhead.
#[derive(Default)]
pub struct VerticalCache {
    entries: Vec<(u32, u32, RgbImage)>,
}

impl VerticalCache {
    pub fn try_take(&mut self, x: u32, y: u32) -> Option<RgbImage> {
        let idx = self
            .entries
            .iter()
            .position(|(ex, ey, _)| *ex == x && *ey == y)?;
        Some(self.entries.swap_remove(idx).2)
    }

    pub fn insert(&mut self, x: u32, y: u32, tile: RgbImage) {
        self.remove(x, y);
        self.entries.push((x, y, tile));
    }

    pub fn remove(&mut self, x: u32, y: u32) {
        self.entries.retain(|(ex, ey, _)| !(*ex == x && *ey == y));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bottom-edge carry cache: can hold up to a full row of source tiles.
#[derive(Default)]
pub struct HorizontalCache {
    entries: HashMap<u64, RgbImage>,
}

impl HorizontalCache {
    pub fn try_take(&mut self, x: u32, y: u32) -> Option<RgbImage> {
        self.entries.remove(&pack(x, y))
    }

    pub fn insert(&mut self, x: u32, y: u32, tile: RgbImage) {
        self.entries.insert(pack(x, y), tile);
    }

    pub fn remove(&mut self, x: u32, y: u32) {
        self.entries.remove(&pack(x, y));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Double-buffered current/backup pair of stripe caches.
///
/// Reads are served from the "current" generation; carries deposited while
/// processing an output tile land in "backup". The vertical pair rotates
/// after every output tile (its carry is consumed one tile later). The
/// horizontal pair only rotates at the end of an output-tile row: deposits
/// from every tile in the row accumulate in the same backup generation, and
/// become current as a whole once the row finishes, ready for the row
/// below.
#[derive(Default)]
pub struct StripeCachePair {
    current_vertical: VerticalCache,
    current_horizontal: HorizontalCache,
    backup_vertical: VerticalCache,
    backup_horizontal: HorizontalCache,
}

impl StripeCachePair {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_vertical(&mut self, x: u32, y: u32) -> Option<RgbImage> {
        self.current_vertical.try_take(x, y)
    }

    pub fn take_horizontal(&mut self, x: u32, y: u32) -> Option<RgbImage> {
        self.current_horizontal.try_take(x, y)
    }

    pub fn deposit_vertical(&mut self, x: u32, y: u32, tile: RgbImage) {
        self.backup_vertical.insert(x, y, tile);
    }

    pub fn deposit_horizontal(&mut self, x: u32, y: u32, tile: RgbImage) {
        self.backup_horizontal.insert(x, y, tile);
    }

    /// Swap the vertical current/backup generations and clear the new
    /// backup. Called after every output tile.
    pub fn rotate_vertical(&mut self) {
        std::mem::swap(&mut self.current_vertical, &mut self.backup_vertical);
        self.backup_vertical.clear();
    }

    /// Swap the horizontal current/backup generations and clear the new
    /// backup. Called once per output-tile row, after its last tile.
    pub fn rotate_horizontal(&mut self) {
        std::mem::swap(&mut self.current_horizontal, &mut self.backup_horizontal);
        self.backup_horizontal.clear();
    }
}
