//! Error types for mirror fetch operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching files from the mirror.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, broken stream).
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while writing the fetched data.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Every candidate URL for an ebook failed.
    #[error("all candidate URLs failed for ebook {id}: {}", .attempts.join("; "))]
    AllVariantsFailed {
        /// The ebook number whose candidates were exhausted.
        id: u32,
        /// One entry per failed candidate, in attempt order.
        attempts: Vec<String>,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an exhausted-candidates error from per-candidate failures.
    pub fn all_variants_failed(id: u32, attempts: Vec<String>) -> Self {
        Self::AllVariantsFailed { id, attempts }
    }
}

// No `From<reqwest::Error>` or `From<std::io::Error>` impls: the variants
// need context (url, path) the source errors cannot supply, so callers go
// through the helper constructors.
