use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use url::Url;

use super::TileFetcher;
use crate::cancel::CancellationToken;
use crate::error::FetchError;

/// HTTP-backed DZI tile source (§6).
///
/// Builds tile URLs as `{baseUri}/{baseName}_files/{layer}/{col}_{row}.{format}`
/// and retries transient failures `max_retries` times with a fixed interval
/// between attempts, aggregating every captured error on final failure.
pub struct HttpDziSource {
    client: reqwest::Client,
    base_uri: Url,
    base_name: String,
    format: String,
    max_retries: u32,
    retry_interval: Duration,
}

impl HttpDziSource {
    pub fn new(
        manifest_uri: &Url,
        format: String,
        max_retries: u32,
        retry_interval: Duration,
    ) -> Self {
        let (base_uri, base_name) = split_manifest_uri(manifest_uri);
        Self {
            client: reqwest::Client::new(),
            base_uri,
            base_name,
            format,
            max_retries,
            retry_interval,
        }
    }

    fn tile_url(&self, layer: usize, col: u32, row: u32) -> Url {
        self.base_uri
            .join(&format!(
                "{}_files/{}/{}_{}.{}",
                self.base_name, layer, col, row, self.format
            ))
            .expect("tile URL components are already percent-safe")
    }
}

/// Split a manifest URI into its directory (as a base for joins, i.e. with
/// a trailing slash) and its filename stem (without extension).
fn split_manifest_uri(manifest_uri: &Url) -> (Url, String) {
    let mut base_uri = manifest_uri.clone();
    let stem = manifest_uri
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|last| {
            last.rsplit_once('.')
                .map(|(stem, _ext)| stem)
                .unwrap_or(last)
                .to_string()
        })
        .unwrap_or_default();

    // Strip the filename from the path, leaving a directory URI that `join`
    // resolves relative paths against.
    if let Ok(mut segments) = base_uri.path_segments_mut() {
        segments.pop();
        segments.push("");
    }

    (base_uri, stem)
}

#[async_trait]
impl TileFetcher for HttpDziSource {
    async fn fetch(
        &self,
        layer: usize,
        col: u32,
        row: u32,
        cancel: &CancellationToken,
    ) -> Result<Bytes, FetchError> {
        let url = self.tile_url(layer, col, row);
        let mut causes = Vec::new();

        for attempt in 1..=self.max_retries.max(1) {
            cancel
                .check()
                .map_err(|_| FetchError::Cancelled)?;

            match self.client.get(url.clone()).send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .bytes()
                        .await
                        .map_err(|e| FetchError::Transport(e.to_string()));
                }
                Ok(response) if response.status().as_u16() == 404 => {
                    return Err(FetchError::NotFound(url.to_string()));
                }
                Ok(response) => causes.push(format!("HTTP {}", response.status())),
                Err(e) => causes.push(e.to_string()),
            }

            if attempt < self.max_retries {
                tokio::time::sleep(self.retry_interval).await;
            }
        }

        Err(FetchError::RetriesExhausted {
            target: url.to_string(),
            attempts: self.max_retries,
            causes,
        })
    }
}
