//! `rip` - converts a Deep Zoom Image pyramid into a single-file tiled,
//! JPEG-compressed pyramid TIFF.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dzrip::cancel::CancellationToken;
use dzrip::config::Config;
use dzrip::pipeline::orchestrator::{self, RipOptions};
use dzrip::progress::TracingProgressSink;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Source: {}", config.source);
    info!("Output: {}", config.output.display());
    info!(
        "Tile size: {}, quality: {}",
        config.tile_size, config.quality
    );

    let options = RipOptions {
        source_uri: config.source.clone(),
        output_path: config.output.clone(),
        output_tile: config.tile_size,
        quality: config.quality,
        use_shared_quantization_tables: config.use_shared_quantization_tables,
        software: config.software_tag(),
        max_retries: config.max_retries,
        retry_interval: config.retry_interval(),
    };

    let cancel = CancellationToken::new();
    let progress = TracingProgressSink;

    match orchestrator::run(&options, &cancel, &progress).await {
        Ok(()) => {
            info!("Wrote pyramid TIFF to {}", config.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("rip failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem, honoring `DZRIP_LOG` if set.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "dzrip=debug" } else { "dzrip=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("DZRIP_LOG")
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
