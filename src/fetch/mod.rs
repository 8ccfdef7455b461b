//! Sequential fetch pass over the manifest.
//!
//! Books are fetched one at a time in ascending ebook-number order. Anything
//! already on disk is skipped, each 404 falls back through the encoding
//! variants of the archive, and per-book failures are collected rather than
//! aborting the pass.

pub mod client;
pub mod error;
pub mod existence;
pub mod variants;

pub use client::HttpClient;
pub use error::FetchError;

use std::path::Path;

use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_LANGUAGE, Settings};
use crate::failure::FailureLog;
use crate::manifest::Manifest;
use existence::existing_artifact;
use variants::{candidate_urls, url_filename};

/// Counters for one fetch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Books selected for this pass after the language filter.
    pub requested: usize,
    /// Archives downloaded.
    pub downloaded: usize,
    /// Books skipped because an artifact already exists locally.
    pub skipped_existing: usize,
    /// Books skipped because no usable archive is listed for them.
    pub skipped_unlocated: usize,
    /// Books whose every candidate URL failed.
    pub failed: usize,
}

/// Result of a fetch pass: counters plus the collected failures.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Pass counters.
    pub summary: FetchSummary,
    /// Per-book failures for end-of-run reporting.
    pub failures: FailureLog,
}

/// Selects the books to fetch: cataloged books in the target language, in
/// ascending ebook-number order. Books without a recorded language count as
/// English, matching how the catalog omits the attribute for most of its
/// English entries.
#[must_use]
pub fn select_books(manifest: &Manifest, language: &str) -> Vec<u32> {
    manifest
        .ebooks
        .keys()
        .copied()
        .filter(|id| manifest.language(*id).unwrap_or(DEFAULT_LANGUAGE) == language)
        .collect()
}

/// Fetches every selected book that is not already on disk.
///
/// Individual failures are recorded in the outcome; the pass itself always
/// runs to completion. A `limit` stops the pass after that many new
/// downloads, so repeated limited runs keep making progress.
pub async fn fetch_missing(
    client: &HttpClient,
    manifest: &Manifest,
    settings: &Settings,
    limit: Option<usize>,
    progress: Option<&ProgressBar>,
) -> FetchOutcome {
    let ids = select_books(manifest, &settings.language);
    let total = ids.len();
    let mut outcome = FetchOutcome::default();
    outcome.summary.requested = total;

    for (position, id) in ids.into_iter().enumerate() {
        let position = position + 1;
        if let Some(bar) = progress {
            bar.set_message(format!("({position}/{total}) ebook {id}"));
        }

        let (Some(directory), Some(filename)) = (manifest.directory(id), manifest.filename(id))
        else {
            debug!(id, "no archive located; skipping");
            outcome.summary.skipped_unlocated += 1;
            continue;
        };

        // Old-style filenames (leading zero) predate the per-number directory
        // scheme and never resolve against it.
        if filename.starts_with('0') {
            debug!(id, filename, "old-style filename; skipping");
            outcome.summary.skipped_unlocated += 1;
            continue;
        }

        if let Some(existing) = existing_artifact(
            &settings.zipped_dir,
            &settings.unzipped_dir,
            filename,
            &settings.variant_suffixes,
        ) {
            debug!(id, path = %existing.display(), "already fetched; skipping");
            outcome.summary.skipped_existing += 1;
            continue;
        }

        let primary = format!("{}{}/{}", settings.mirror_url, directory, filename);
        let candidates = candidate_urls(&primary, &settings.variant_suffixes);

        match fetch_first_variant(client, id, &candidates, &settings.zipped_dir).await {
            Ok((url, bytes)) => {
                info!(position, total, id, url = %url, bytes, "fetched ebook archive");
                outcome.summary.downloaded += 1;
                if limit.is_some_and(|limit| outcome.summary.downloaded >= limit) {
                    info!(downloaded = outcome.summary.downloaded, "download limit reached");
                    break;
                }
            }
            Err(error) => {
                warn!(position, total, id, %error, "fetch failed");
                outcome
                    .failures
                    .record(id, manifest.title(id).unwrap_or_default(), error.to_string());
                outcome.summary.failed += 1;
            }
        }
    }

    outcome
}

/// Tries each candidate URL in order, saving the first success under its own
/// filename in the zipped directory.
async fn fetch_first_variant(
    client: &HttpClient,
    id: u32,
    candidates: &[String],
    zipped_dir: &Path,
) -> Result<(String, u64), FetchError> {
    let mut attempts = Vec::new();
    for url in candidates {
        let dest = zipped_dir.join(url_filename(url));
        match client.download_to_path(url, &dest).await {
            Ok(bytes) => return Ok((url.clone(), bytes)),
            Err(error) => {
                debug!(id, url = %url, %error, "candidate failed");
                attempts.push(error.to_string());
            }
        }
    }
    Err(FetchError::all_variants_failed(id, attempts))
}
