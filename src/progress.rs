//! Progress event sink (C15).
//!
//! The engine is sink-agnostic: it reports against the trait object below,
//! and the `rip` binary supplies a `tracing`-backed implementation. Default
//! method bodies do nothing, so a test double only needs to override what it
//! checks.

/// Outbound progress events (§6). All methods have a no-op default.
pub trait ProgressSink: Send + Sync {
    fn start_base(&self, _tile_count: u64) {}
    fn base_progress(&self, _done: u64, _total: u64) {}
    fn complete_base(&self, _tile_count: u64, _total_bytes: u64) {}
    fn start_pyramid(&self, _layer_count: usize) {}
    fn start_layer(&self, _layer: usize, _tile_count: u64, _width: u32, _height: u32) {}
    fn layer_progress(&self, _layer: usize, _done: u64, _total: u64) {}
    fn complete_layer(&self, _layer: usize, _tile_count: u64, _bytes: u64) {}
    fn complete_pyramid(&self, _layer_count: usize) {}
}

/// Discards every event; useful in tests and as a library default.
#[derive(Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {}

/// Emits one `tracing` event per progress callback, at `info` for
/// phase boundaries and `debug` for per-tile progress.
#[derive(Default)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn start_base(&self, tile_count: u64) {
        tracing::info!(tile_count, "starting base layer");
    }

    fn base_progress(&self, done: u64, total: u64) {
        tracing::debug!(done, total, "base layer progress");
    }

    fn complete_base(&self, tile_count: u64, total_bytes: u64) {
        tracing::info!(tile_count, total_bytes, "base layer complete");
    }

    fn start_pyramid(&self, layer_count: usize) {
        tracing::info!(layer_count, "starting pyramid generation");
    }

    fn start_layer(&self, layer: usize, tile_count: u64, width: u32, height: u32) {
        tracing::info!(layer, tile_count, width, height, "starting pyramid layer");
    }

    fn layer_progress(&self, layer: usize, done: u64, total: u64) {
        tracing::debug!(layer, done, total, "pyramid layer progress");
    }

    fn complete_layer(&self, layer: usize, tile_count: u64, bytes: u64) {
        tracing::info!(layer, tile_count, bytes, "pyramid layer complete");
    }

    fn complete_pyramid(&self, layer_count: usize) {
        tracing::info!(layer_count, "pyramid generation complete");
    }
}
