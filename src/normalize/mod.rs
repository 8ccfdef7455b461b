//! Normalization of raw book texts into self-describing artifacts.
//!
//! A raw text from the unzipped directory is cleaned down to its body
//! paragraphs, paired with its catalog title, and written to the output
//! directory under a canonical filename derived from that title. The first
//! line of every artifact is a JSON metadata record; the library scan keys
//! on it to keep re-runs from redoing finished books.

pub mod cleaner;
pub mod encoding;
pub mod record;

pub use cleaner::{CleanedText, clean_text};
pub use record::{BookMeta, UNKNOWN_AUTHOR, UNKNOWN_TITLE, canonical_filename, split_title};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::fetch::variants::base_stem;
use crate::library::Library;
use crate::manifest::Manifest;

/// Language recorded for books the catalog does not list.
pub const UNKNOWN_LANGUAGE: &str = "UNKNOWN_LANGUAGE";

/// Errors that can occur while normalizing raw texts.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A raw source file could not be read.
    #[error("Failed to read source '{path}': {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An output artifact could not be written.
    #[error("Failed to write artifact '{path}': {source}")]
    Write {
        /// Path that failed to write.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The metadata header could not be encoded.
    #[error("Failed to encode metadata header: {source}")]
    Header {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The unzipped directory could not be scanned.
    #[error("Failed to scan '{path}': {source}")]
    Scan {
        /// Directory that failed to scan.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl NormalizeError {
    fn read(path: &Path, source: io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    fn scan(path: &Path, source: io::Error) -> Self {
        Self::Scan {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Counters for one normalize pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    /// Raw text files found in the unzipped directory.
    pub scanned: usize,
    /// Artifacts written this pass.
    pub normalized: usize,
    /// Files skipped because their bookno is already in the library.
    pub skipped_in_library: usize,
    /// Files skipped by the language filter.
    pub skipped_language: usize,
    /// Files that could not be normalized.
    pub failed: usize,
}

/// Cleans one raw text and writes its artifact.
///
/// The artifact lands in the output directory under the canonical filename
/// for `catalog_title`, so two raw variants of the same book collapse into
/// one file. Returns the artifact path.
pub fn normalize_file(
    source_path: &Path,
    catalog_title: &str,
    settings: &Settings,
) -> Result<PathBuf, NormalizeError> {
    let raw = fs::read(source_path).map_err(|error| NormalizeError::read(source_path, error))?;
    let cleaned = clean_text(&raw, &settings.boilerplate_prefixes);
    if !cleaned.start_seen {
        warn!(path = %source_path.display(), "no start marker found; body is empty");
    } else if !cleaned.end_seen {
        warn!(path = %source_path.display(), "no end marker found; collected to end of file");
    }

    let source_filename = source_path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let meta = BookMeta::from_catalog(catalog_title, &source_filename);
    let header = meta
        .to_header_line()
        .map_err(|source| NormalizeError::Header { source })?;

    // Header line, body on the next line, one blank line between paragraphs.
    let mut content = header;
    for paragraph in &cleaned.paragraphs {
        content.push('\n');
        content.push_str(paragraph);
        content.push('\n');
    }

    let out_path = settings.output_dir.join(canonical_filename(catalog_title));
    fs::write(&out_path, content.as_bytes())
        .map_err(|error| NormalizeError::write(&out_path, error))?;
    Ok(out_path)
}

/// Runs the normalize pass over every raw text in the unzipped directory.
///
/// The library is a snapshot taken before the pass; books it already holds
/// are skipped. Titles and languages come from the manifest, with unknown
/// fallbacks for books the catalog does not list. Per-file failures are
/// counted and the pass continues.
pub fn normalize_pass(
    manifest: &Manifest,
    library: &Library,
    settings: &Settings,
) -> Result<NormalizeSummary, NormalizeError> {
    let sources = text_sources(&settings.unzipped_dir)?;
    let total = sources.len();
    let mut summary = NormalizeSummary {
        scanned: total,
        ..NormalizeSummary::default()
    };

    for (position, path) in sources.iter().enumerate() {
        let position = position + 1;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let bookno = base_stem(&filename);

        if library.contains(&bookno) {
            debug!(bookno = %bookno, "already in library; skipping");
            summary.skipped_in_library += 1;
            continue;
        }

        let id = bookno.parse::<u32>().ok();
        let title = id.and_then(|id| manifest.title(id)).unwrap_or(UNKNOWN_TITLE);
        let language = id
            .and_then(|id| manifest.language(id))
            .unwrap_or(UNKNOWN_LANGUAGE);

        if language != settings.language && !settings.accept_unknown_language {
            debug!(bookno = %bookno, language, "language filtered; skipping");
            summary.skipped_language += 1;
            continue;
        }

        match normalize_file(path, title, settings) {
            Ok(out_path) => {
                info!(
                    position,
                    total,
                    bookno = %bookno,
                    title,
                    language,
                    out = %out_path.display(),
                    "normalized"
                );
                summary.normalized += 1;
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "normalize failed");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Raw text files in the unzipped directory, in sorted order. A missing
/// directory yields an empty list, same as a directory with no texts.
fn text_sources(unzipped_dir: &Path) -> Result<Vec<PathBuf>, NormalizeError> {
    let entries = match fs::read_dir(unzipped_dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %unzipped_dir.display(), "no unzipped directory; nothing to normalize");
            return Ok(Vec::new());
        }
        Err(error) => return Err(NormalizeError::scan(unzipped_dir, error)),
    };

    let mut sources = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|error| NormalizeError::scan(unzipped_dir, error))?
            .path();
        if is_text_file(&path) {
            sources.push(path);
        }
    }
    sources.sort();
    Ok(sources)
}

fn is_text_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}
