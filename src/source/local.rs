use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

use super::TileFetcher;
use crate::cancel::CancellationToken;
use crate::error::FetchError;

/// Filesystem-backed DZI tile source: reads
/// `{base}/{baseName}_files/{layer}/{col}_{row}.{format}` directly.
pub struct LocalDziSource {
    files_dir: PathBuf,
    format: String,
}

impl LocalDziSource {
    /// `manifest_path` is the path to the `.dzi` manifest file itself; the
    /// tile tree lives alongside it in `{stem}_files/`.
    pub fn new(manifest_path: &std::path::Path, format: String) -> Self {
        let stem = manifest_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let files_dir = manifest_path
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join(format!("{stem}_files"));
        Self { files_dir, format }
    }

    fn tile_path(&self, layer: usize, col: u32, row: u32) -> PathBuf {
        self.files_dir
            .join(layer.to_string())
            .join(format!("{col}_{row}.{}", self.format))
    }
}

#[async_trait]
impl TileFetcher for LocalDziSource {
    async fn fetch(
        &self,
        layer: usize,
        col: u32,
        row: u32,
        cancel: &CancellationToken,
    ) -> Result<Bytes, FetchError> {
        cancel.check().map_err(|_| FetchError::Cancelled)?;

        let path = self.tile_path(layer, col, row);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(FetchError::Transport(e.to_string())),
        }
    }
}
