use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use super::TileFetcher;
use crate::cancel::CancellationToken;
use crate::error::FetchError;
use crate::io::{FileRangeReader, RangeReader};
use crate::tiff::header::TiffHeader;
use crate::tiff::TiffIfd;

/// A local pyramidal TIFF treated as a degenerate one-layer DZI (§6):
/// instead of decoding the whole file like [`super::SingleRasterSource`],
/// this reads the base IFD's own tile grid directly through a
/// [`RangeReader`], so opening a large input never materializes more than
/// one tile at a time.
pub struct TiffPassthroughSource {
    reader: FileRangeReader,
    ifd: TiffIfd,
}

impl TiffPassthroughSource {
    pub async fn open(path: &Path) -> Result<Self, FetchError> {
        let reader = FileRangeReader::open(path)
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let header_bytes = reader
            .read_exact_at(0, 16.min(reader.size() as usize))
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let header = TiffHeader::parse(&header_bytes).map_err(|e| FetchError::Transport(e.to_string()))?;

        let ifd = TiffIfd::read(&reader, &header, header.first_ifd_offset)
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self { reader, ifd })
    }

    /// The source's own tile side, to be used as the degenerate manifest's
    /// `tile_size` (overlap is always 0 for a passthrough source).
    pub fn tile_size(&self) -> u32 {
        self.ifd.tile_width
    }

    pub fn width(&self) -> u32 {
        self.ifd.image_width
    }

    pub fn height(&self) -> u32 {
        self.ifd.image_length
    }
}

#[async_trait]
impl TileFetcher for TiffPassthroughSource {
    async fn fetch(
        &self,
        _layer: usize,
        col: u32,
        row: u32,
        cancel: &CancellationToken,
    ) -> Result<Bytes, FetchError> {
        cancel.check().map_err(|_| FetchError::Cancelled)?;

        if col >= self.ifd.col_count() || row >= self.ifd.row_count() {
            return Err(FetchError::NotFound(format!("{col}_{row}")));
        }

        let index = (row * self.ifd.col_count() + col) as usize;
        let offset = self.ifd.tile_offsets[index];
        let len = self.ifd.tile_byte_counts[index] as usize;

        self.reader
            .read_exact_at(offset, len)
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}
