//! # dzrip
//!
//! Converts Deep Zoom Image (DZI) tile pyramids into a single-file tiled,
//! JPEG-compressed pyramid TIFF.
//!
//! The source DZI is re-tiled into a regular grid at the caller's chosen
//! tile size (the Region Filler, [`region`]), JPEG-encoded, and written
//! incrementally as the base IFD of a tiled pyramid TIFF ([`tiff`],
//! [`jpeg`]). A chain of coarser IFDs is then appended by repeatedly
//! block-averaging the most recently written level ([`pipeline::pyramid`]).
//!
//! ## Architecture
//!
//! - [`manifest`] - DZI XML manifest parsing
//! - [`source`] - Tile fetcher contract and its HTTP/local/raster variants
//! - [`tile`] - Tile decode and the stripe cache used to re-tile DZI edges
//! - [`region`] - Region Filler: fills one output tile from source tiles
//! - [`tiff`] - Tiled pyramid TIFF/BigTIFF reader and incremental writer
//! - [`jpeg`] - JPEG tile encoding and quantization table construction
//! - [`pipeline`] - Base-layer writer, pyramid generator, and orchestrator
//! - [`geometry`] - Layer/tile grid arithmetic shared across the above
//! - [`progress`] - Progress event sink
//! - [`cancel`] - Cooperative cancellation token
//! - [`config`] - CLI argument types
//!
//! ## Example
//!
//! ```rust,no_run
//! use dzrip::cancel::CancellationToken;
//! use dzrip::config::Config;
//! use dzrip::pipeline::orchestrator::{self, RipOptions};
//! use dzrip::progress::TracingProgressSink;
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::parse();
//!     config.validate().expect("invalid configuration");
//!
//!     let options = RipOptions {
//!         source_uri: config.source.clone(),
//!         output_path: config.output.clone(),
//!         output_tile: config.tile_size,
//!         quality: config.quality,
//!         use_shared_quantization_tables: config.use_shared_quantization_tables,
//!         software: config.software_tag(),
//!         max_retries: config.max_retries,
//!         retry_interval: config.retry_interval(),
//!     };
//!
//!     let cancel = CancellationToken::new();
//!     let progress = TracingProgressSink;
//!     orchestrator::run(&options, &cancel, &progress).await.expect("rip failed");
//! }
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod jpeg;
pub mod manifest;
pub mod pipeline;
pub mod progress;
pub mod region;
pub mod source;
pub mod tile;
pub mod tiff;

pub use cancel::CancellationToken;
pub use config::Config;
pub use error::{FetchError, ManifestError, RipError, TiffError};
pub use manifest::Manifest;
pub use pipeline::orchestrator::{self, RipOptions};
pub use progress::{NullProgressSink, ProgressSink, TracingProgressSink};
pub use source::{HttpDziSource, LocalDziSource, SingleRasterSource, TileFetcher};
