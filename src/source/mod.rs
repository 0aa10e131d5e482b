//! Tile Fetcher contract and its concrete variants (C1, C11).
//!
//! The engine consumes a small capability — "given `(layer,col,row)`, give
//! me the tile's encoded bytes" — behind the [`TileFetcher`] trait, never
//! calling it concurrently (§5). Retries and idempotence are the
//! responsibility of each concrete variant.

mod http;
mod local;
mod raster;
mod tiff_passthrough;

pub use http::HttpDziSource;
pub use local::LocalDziSource;
pub use raster::SingleRasterSource;
pub use tiff_passthrough::TiffPassthroughSource;

use async_trait::async_trait;
use bytes::Bytes;

use crate::cancel::CancellationToken;
use crate::error::FetchError;

/// Resolves `(layer, col, row)` to the raw encoded bytes of one DZI tile.
///
/// Implementations must be idempotent on retry: calling `fetch` twice for
/// the same coordinates returns the same bytes (barring transient failure).
#[async_trait]
pub trait TileFetcher: Send + Sync {
    async fn fetch(
        &self,
        layer: usize,
        col: u32,
        row: u32,
        cancel: &CancellationToken,
    ) -> Result<Bytes, FetchError>;
}
