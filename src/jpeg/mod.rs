//! JPEG tile encoding and the shared quantization-table metadata (C7).

pub mod encoder;
pub mod quant;

pub use encoder::encode_tile;
pub use quant::jpeg_tables_stream;
