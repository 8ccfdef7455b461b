//! HTTP client wrapper for mirror downloads.
//!
//! A thin layer over `reqwest` that streams response bodies to disk with
//! timeout configuration and context-rich errors.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use super::error::FetchError;
use crate::config::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS};

/// HTTP client for fetching index files and ebook archives.
///
/// Created once per run and reused for every request so connections to the
/// mirror are pooled.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::new_with_timeouts(DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Downloads `url` to exactly `path`, streaming the body to disk.
    ///
    /// Returns the number of bytes written. A partially written file is
    /// removed when the transfer fails.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the request fails (network error, timeout),
    /// the server returns an error status, or writing to disk fails.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn download_to_path(&self, url: &str, path: &Path) -> Result<u64, FetchError> {
        let response = self.send_get(url).await?;

        let mut file = File::create(path)
            .await
            .map_err(|e| FetchError::io(path, e))?;

        match stream_to_file(&mut file, response, url, path).await {
            Ok(bytes_written) => {
                debug!(bytes = bytes_written, path = %path.display(), "download complete");
                Ok(bytes_written)
            }
            Err(error) => {
                drop(file);
                let _ = tokio::fs::remove_file(path).await;
                Err(error)
            }
        }
    }

    async fn send_get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(url)
            } else {
                FetchError::network(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }
}

/// Streams the response body to a file, returning bytes written.
///
/// Extracted so the caller can clean up the partial file on error.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, FetchError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::network(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FetchError::io(path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| FetchError::io(path, e))?;
    Ok(bytes_written)
}

fn default_user_agent() -> String {
    format!("gutenmill/{}", env!("CARGO_PKG_VERSION"))
}
