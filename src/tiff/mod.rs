//! Tiled pyramid TIFF container: header/BigTIFF selection, incremental
//! writer, and the minimal reader used by the downsample pass (C7, C8).

pub mod header;
pub mod reader;
pub mod tags;
pub mod writer;

pub use header::{use_big_tiff, ByteOrder, TiffHeader};
pub use reader::TiffIfd;
pub use tags::{Compression, FieldType, TiffTag};
pub use writer::{TileIfdParams, TiffWriter};
