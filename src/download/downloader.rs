//! Streams resolved media to local files inside the batch working directory.

use crate::core::config::{network, PipelineConfig};
use crate::core::error::AppResult;
use crate::download::error::NetworkError;
use crate::download::media::{MediaItem, MediaReference};
use futures_util::StreamExt;
use std::path::Path;
use std::time::Instant;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Downloads one media reference at a time, in fixed-size chunks, never
/// buffering a whole file in memory.
pub struct MediaDownloader {
    client: reqwest::Client,
    chunk_size: usize,
}

impl MediaDownloader {
    pub fn new(config: &PipelineConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.media_timeout)
            .connect_timeout(network::connect_timeout().min(config.media_timeout))
            .build()?;
        Ok(Self {
            client,
            chunk_size: config.chunk_size,
        })
    }

    /// Local file name for the item at 1-based `position`.
    pub fn file_name(reference: &MediaReference, position: usize) -> String {
        format!("media_{}.{}", position, reference.kind().extension())
    }

    /// Fetch `reference` into `dest_dir`.
    ///
    /// A non-success status fails before any file is created. A failure while
    /// streaming removes the partial file.
    pub async fn download(&self, reference: &MediaReference, position: usize, dest_dir: &Path) -> AppResult<MediaItem> {
        let path = dest_dir.join(Self::file_name(reference, position));
        let started = Instant::now();

        let response = self.client.get(reference.source_url()).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("Media {} answered HTTP {} for item {}", reference.source_url(), status, position);
            return Err(NetworkError::HttpStatus(status).into());
        }

        match self.stream_to_file(response, &path).await {
            Ok(size_bytes) => {
                log::info!(
                    "Downloaded item {} ({}) {} bytes in {:.1}s -> {}",
                    position,
                    reference.kind().as_str(),
                    size_bytes,
                    started.elapsed().as_secs_f64(),
                    path.display()
                );
                Ok(MediaItem {
                    reference: reference.clone(),
                    local_path: path,
                    size_bytes,
                })
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    if remove_err.kind() != std::io::ErrorKind::NotFound {
                        log::warn!("Failed to remove partial file {}: {}", path.display(), remove_err);
                    }
                }
                Err(e)
            }
        }
    }

    async fn stream_to_file(&self, response: reqwest::Response, path: &Path) -> AppResult<u64> {
        let file = tokio::fs::File::create(path).await?;
        let mut writer = BufWriter::with_capacity(self.chunk_size, file);
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        writer.flush().await?;
        Ok(written)
    }
}
