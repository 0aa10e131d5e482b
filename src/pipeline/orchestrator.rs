//! Orchestrator (C9): resolves the source, computes geometry, and sequences
//! the base-layer writer then the pyramid generator.

use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::cancel::CancellationToken;
use crate::error::{FetchError, RipError};
use crate::geometry::base_layer_index;
use crate::jpeg::jpeg_tables_stream;
use crate::manifest::Manifest;
use crate::pipeline::base_writer::write_base_layer;
use crate::pipeline::pyramid::generate_pyramid;
use crate::progress::ProgressSink;
use crate::source::{
    HttpDziSource, LocalDziSource, SingleRasterSource, TiffPassthroughSource, TileFetcher,
};
use crate::tiff::{header::use_big_tiff, header::TiffHeader, TiffWriter};

/// Parameters for a single rip, independent of how they were collected
/// (CLI, library caller, test harness).
pub struct RipOptions {
    pub source_uri: String,
    pub output_path: PathBuf,
    pub output_tile: u32,
    pub quality: u8,
    pub use_shared_quantization_tables: bool,
    pub software: Option<String>,
    pub max_retries: u32,
    pub retry_interval: Duration,
}

/// Run one full rip: resolve the source, write the base IFD, then the
/// pyramid chain.
pub async fn run(
    options: &RipOptions,
    cancel: &CancellationToken,
    progress: &dyn ProgressSink,
) -> Result<(), RipError> {
    let (manifest, fetcher) = resolve_source(options).await?;

    let base_layer = base_layer_index(manifest.width, manifest.height);
    let is_bigtiff = use_big_tiff(manifest.width, manifest.height);
    let jpeg_tables = options
        .use_shared_quantization_tables
        .then(|| jpeg_tables_stream(options.quality));

    let mut writer = TiffWriter::create(&options.output_path, is_bigtiff).await?;

    let base_result = write_base_layer(
        &mut writer,
        fetcher.as_ref(),
        &manifest,
        base_layer,
        options.output_tile,
        options.quality,
        jpeg_tables.clone(),
        options.software.clone(),
        cancel,
        progress,
    )
    .await?;

    generate_pyramid(
        &mut writer,
        &options.output_path,
        base_result.ifd_offset,
        manifest.width,
        manifest.height,
        options.output_tile,
        is_bigtiff,
        options.quality,
        jpeg_tables,
        options.software.clone(),
        cancel,
        progress,
    )
    .await?;

    Ok(())
}

/// Resolve `source_uri` to a parsed [`Manifest`] and its matching
/// [`TileFetcher`] (§6): HTTP and `file://`/local-path manifests are parsed
/// as DZI XML; a local path that isn't valid DZI XML is treated as a
/// degenerate one-layer raster source.
async fn resolve_source(
    options: &RipOptions,
) -> Result<(Manifest, Box<dyn TileFetcher>), RipError> {
    if let Ok(uri) = Url::parse(&options.source_uri) {
        if uri.scheme() == "http" || uri.scheme() == "https" {
            let bytes = reqwest::get(uri.clone())
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?
                .bytes()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            let manifest = Manifest::parse(&bytes)?;
            let fetcher = HttpDziSource::new(
                &uri,
                manifest.format.clone(),
                options.max_retries,
                options.retry_interval,
            );
            return Ok((manifest, Box::new(fetcher)));
        }
        if uri.scheme() == "file" {
            let path = uri
                .to_file_path()
                .map_err(|_| RipError::InvalidArgument(format!("bad file URI: {}", uri)))?;
            return resolve_local_source(&path).await;
        }
    }

    resolve_local_source(Path::new(&options.source_uri)).await
}

async fn resolve_local_source(
    path: &Path,
) -> Result<(Manifest, Box<dyn TileFetcher>), RipError> {
    let bytes = tokio::fs::read(path).await?;

    if let Ok(manifest) = Manifest::parse(&bytes) {
        let fetcher = LocalDziSource::new(path, manifest.format.clone());
        return Ok((manifest, Box::new(fetcher)));
    }

    // A local pyramidal TIFF is read tile-by-tile through its own base IFD
    // rather than decoded whole, so large inputs stay cheap to open.
    if TiffHeader::parse(&bytes[..bytes.len().min(16)]).is_ok() {
        let source = TiffPassthroughSource::open(path).await?;
        let manifest = Manifest {
            format: "jpeg".to_string(),
            tile_size: source.tile_size(),
            overlap: 0,
            width: source.width(),
            height: source.height(),
        };
        return Ok((manifest, Box::new(source)));
    }

    let source = SingleRasterSource::open(path).await?;
    let manifest = Manifest {
        format: "png".to_string(),
        tile_size: source.tile_size(),
        overlap: 0,
        width: source.width(),
        height: source.height(),
    };
    Ok((manifest, Box::new(source)))
}
