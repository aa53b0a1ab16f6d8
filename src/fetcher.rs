//! File transfer with atomic destination visibility
//!
//! The transfer streams into a `.part` file beside the final path and renames
//! it into place only after the body has been fully written, so an
//! interrupted transfer never leaves a half-written file at the destination.
//! Retry policy belongs to callers; a failure here is reported, not retried.

use crate::error::FetchError;
use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Transfer seam between the scheduler and the network
///
/// The scheduler only ever talks to this trait, so orchestration tests can
/// inject instrumented implementations and every failure comes back as a
/// value — nothing a worker hits can be swallowed by the pool.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Transfer the resource at `url` to `destination`
    ///
    /// Creates missing parent directories, never leaves a partial file
    /// visible at `destination`, and returns the number of bytes written.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, FetchError>;
}

/// Production fetcher backed by the shared HTTP client
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher on top of an (authenticated) client
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| FetchError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let part_path = part_path_for(destination);
        let written = match write_body(response, &part_path, url).await {
            Ok(written) => written,
            Err(e) => {
                // Best effort: don't leave the partial file behind.
                tokio::fs::remove_file(&part_path).await.ok();
                return Err(e);
            }
        };

        tokio::fs::rename(&part_path, destination)
            .await
            .map_err(|source| FetchError::Write {
                path: destination.to_path_buf(),
                source,
            })?;

        tracing::debug!(url, path = %destination.display(), written, "transfer complete");
        Ok(written)
    }
}

/// Stream the response body into `part_path`, returning bytes written
async fn write_body(
    response: reqwest::Response,
    part_path: &Path,
    url: &str,
) -> Result<u64, FetchError> {
    let write_err = |source: std::io::Error| FetchError::Write {
        path: part_path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::create(part_path).await.map_err(write_err)?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk).await.map_err(write_err)?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(write_err)?;
    Ok(written)
}

/// The temporary sibling a transfer streams into before the rename
fn part_path_for(destination: &Path) -> PathBuf {
    let mut name = destination.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    destination.with_file_name(name)
}
