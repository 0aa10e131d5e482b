use thiserror::Error;

/// Errors raised while parsing or validating a DZI manifest.
#[derive(Debug, Clone, Error)]
pub enum ManifestError {
    #[error("malformed manifest XML: {0}")]
    Malformed(String),

    #[error("missing required attribute '{0}' on <Image> or <Size>")]
    MissingAttribute(&'static str),

    #[error("invalid value for '{attribute}': {value}")]
    InvalidAttribute { attribute: &'static str, value: String },

    #[error("width, height and tile_size must be positive, got width={width} height={height} tile_size={tile_size}")]
    NonPositiveDimension {
        width: u32,
        height: u32,
        tile_size: u32,
    },
}

/// Errors raised while fetching a single DZI tile's encoded bytes.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("tile not found: {0}")]
    NotFound(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("fetch cancelled")]
    Cancelled,

    #[error("all {attempts} attempts failed for {target}: {causes:?}")]
    RetriesExhausted {
        target: String,
        attempts: u32,
        causes: Vec<String>,
    },
}

/// Errors raised by the TIFF container reader/writer.
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    #[error("invalid TIFF version: expected 42 (TIFF) or 43 (BigTIFF), got {0}")]
    InvalidVersion(u16),

    #[error("invalid BigTIFF offset byte size: expected 8, got {0}")]
    InvalidBigTiffOffsetSize(u16),

    #[error("file too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    #[error("invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    #[error("missing required tag: {0}")]
    MissingTag(&'static str),

    #[error("invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },

    #[error("unsupported compression: {0} (only JPEG is supported)")]
    UnsupportedCompression(String),

    #[error("unsupported organization: file uses strips instead of tiles")]
    StripOrganization,
}

impl From<std::io::Error> for TiffError {
    fn from(err: std::io::Error) -> Self {
        TiffError::Io(err.to_string())
    }
}

/// Top-level error type returned by all fallible public operations of the engine.
#[derive(Debug, Clone, Error)]
pub enum RipError {
    #[error("invalid manifest: {0}")]
    ManifestInvalid(#[from] ManifestError),

    #[error("fetch failed: {0}")]
    FetchFailed(#[from] FetchError),

    #[error("tile decode failed: {0}")]
    DecodeFailed(String),

    #[error("tile encode failed: {0}")]
    EncodeFailed(String),

    #[error("I/O error: {0}")]
    IoFailed(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<TiffError> for RipError {
    fn from(err: TiffError) -> Self {
        RipError::IoFailed(err.to_string())
    }
}

impl From<std::io::Error> for RipError {
    fn from(err: std::io::Error) -> Self {
        RipError::IoFailed(err.to_string())
    }
}

impl From<image::ImageError> for RipError {
    fn from(err: image::ImageError) -> Self {
        RipError::DecodeFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RipError>;
