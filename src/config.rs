//! Configuration management for `rip`.
//!
//! Supports:
//! - Command-line arguments via clap
//! - The `DZRIP_LOG` environment variable for log filtering
//! - Sensible defaults for all optional settings

use clap::Parser;
use std::time::Duration;

// =============================================================================
// Default Values
// =============================================================================

/// Default output tile side in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default JPEG quality (1-100).
pub const DEFAULT_QUALITY: u8 = 85;

/// Default fetch retry count.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay between fetch retries, in milliseconds.
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 1000;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Convert a Deep Zoom Image pyramid into a single-file tiled, JPEG-compressed
/// pyramid TIFF.
#[derive(Parser, Debug, Clone)]
#[command(name = "rip")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Source: a `.dzi` manifest URL or local path, or a local raster file.
    pub source: String,

    /// Path to write the resulting pyramid TIFF to.
    #[arg(short, long)]
    pub output: std::path::PathBuf,

    /// Output tile side in pixels; must be a multiple of 16.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_size: u32,

    /// JPEG quality for encoded tiles (1-100).
    #[arg(long, default_value_t = DEFAULT_QUALITY)]
    pub quality: u8,

    /// Omit the TIFF `Software` tag from every IFD.
    #[arg(long, default_value_t = false)]
    pub no_software_field: bool,

    /// Store one shared `JPEGTables` quantization table per IFD instead of
    /// fully self-contained per-tile JPEG streams.
    #[arg(long, default_value_t = false)]
    pub use_shared_quantization_tables: bool,

    /// Number of attempts per tile fetch before giving up.
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Delay between fetch retries, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_RETRY_INTERVAL_MS)]
    pub retry_interval_ms: u64,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, default_value_t = false, env = "DZRIP_VERBOSE")]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.tile_size == 0 || self.tile_size % 16 != 0 {
            return Err(format!(
                "tile_size must be a positive multiple of 16, got {}",
                self.tile_size
            ));
        }

        if self.quality == 0 || self.quality > 100 {
            return Err("quality must be between 1 and 100".to_string());
        }

        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".to_string());
        }

        Ok(())
    }

    /// The per-attempt delay between fetch retries.
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// The `Software` tag value to embed in every IFD, or `None` if disabled.
    pub fn software_tag(&self) -> Option<String> {
        if self.no_software_field {
            None
        } else {
            Some(format!("rip/{}", env!("CARGO_PKG_VERSION")))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            source: "https://example.com/slide.dzi".to_string(),
            output: std::path::PathBuf::from("/tmp/out.tiff"),
            tile_size: 256,
            quality: 85,
            no_software_field: false,
            use_shared_quantization_tables: false,
            max_retries: 3,
            retry_interval_ms: 1000,
            verbose: false,
        }
    }

    #[test]
    fn test_valid_config() {
        let config = test_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tile_size_must_be_multiple_of_16() {
        let mut config = test_config();
        config.tile_size = 250;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_quality() {
        let mut config = test_config();
        config.quality = 0;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_retries_rejected() {
        let mut config = test_config();
        config.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_software_tag_disabled() {
        let mut config = test_config();
        config.no_software_field = true;
        assert_eq!(config.software_tag(), None);
    }

    #[test]
    fn test_software_tag_enabled() {
        let config = test_config();
        assert!(config.software_tag().unwrap().starts_with("rip/"));
    }

    #[test]
    fn test_retry_interval() {
        let config = test_config();
        assert_eq!(config.retry_interval(), Duration::from_millis(1000));
    }
}
