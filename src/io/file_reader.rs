use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::RangeReader;
use crate::error::TiffError;

/// Local-file-backed implementation of [`RangeReader`].
///
/// Used to reopen the output TIFF for read during the pyramid downsample
/// pass (§4.6) while the same file remains open for append.
pub struct FileRangeReader {
    path: std::path::PathBuf,
    size: u64,
}

impl FileRangeReader {
    /// Open `path` for random-access reads, caching its size on construction.
    pub async fn open(path: impl Into<std::path::PathBuf>) -> Result<Self, TiffError> {
        let path = path.into();
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| TiffError::Io(e.to_string()))?;
        Ok(Self {
            path,
            size: metadata.len(),
        })
    }
}

#[async_trait]
impl RangeReader for FileRangeReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, TiffError> {
        if offset + len as u64 > self.size {
            return Err(TiffError::FileTooSmall {
                required: offset + len as u64,
                actual: self.size,
            });
        }
        if len == 0 {
            return Ok(Bytes::new());
        }

        let mut file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| TiffError::Io(e.to_string()))?;
        file.seek(std::io::SeekFrom::Start(offset))
            .await
            .map_err(|e| TiffError::Io(e.to_string()))?;

        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)
            .await
            .map_err(|e| TiffError::Io(e.to_string()))?;

        Ok(Bytes::from(buf))
    }

    fn size(&self) -> u64 {
        self.size
    }
}
