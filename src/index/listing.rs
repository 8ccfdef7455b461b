//! Parser for the mirror's recursive `ls-lR` directory listing.
//!
//! The listing is served gzip-compressed and alternates directory headers
//! with `ls -l` style entry lines:
//!
//! ```text
//! ./1/0/0/100:
//! total 512
//! -rw-r--r-- 1 gb gb  12345 Jan  1  2020 100-0.zip
//! -rw-r--r-- 1 gb gb  34567 Jan  1  2020 100.zip
//! ```
//!
//! Only zip archives named after an ebook number are indexed. Directory
//! blocks for superseded editions (`old`) and format/author subtrees
//! (hyphenated names) are skipped entirely.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use flate2::read::GzDecoder;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

#[allow(clippy::expect_used)]
static ZIP_UTF8_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" (\d+-0\.zip)").expect("utf-8 zip filename regex is valid"));

#[allow(clippy::expect_used)]
static ZIP_EIGHT_BIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" (\d+-8\.zip)").expect("eight-bit zip filename regex is valid"));

#[allow(clippy::expect_used)]
static ZIP_PLAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" (\d+\.zip)").expect("plain zip filename regex is valid"));

/// Errors that can occur while reading the directory listing.
#[derive(Debug, Error)]
pub enum ListingError {
    /// The listing file could not be opened.
    #[error("Failed to open listing file '{path}': {source}")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The listing stream could not be read or decompressed.
    #[error("Failed to read listing data: {source}")]
    Read {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ListingError {
    fn open(path: &Path, source: std::io::Error) -> Self {
        Self::Open {
            path: path.to_path_buf(),
            source,
        }
    }

    fn read(source: std::io::Error) -> Self {
        Self::Read { source }
    }
}

/// Parsed listing: mirror location of each ebook's zip archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingIndex {
    /// Ebook number to mirror directory, relative to the mirror root.
    pub directories: BTreeMap<u32, String>,
    /// Ebook number to zip filename within its directory.
    pub filenames: BTreeMap<u32, String>,
}

impl ListingIndex {
    /// Number of located ebooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filenames.len()
    }

    /// Returns `true` when no ebook archives were located.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty()
    }
}

/// Opens a gzip-compressed listing file and parses it.
pub fn parse_listing_file(path: &Path) -> Result<ListingIndex, ListingError> {
    let file = File::open(path).map_err(|e| ListingError::open(path, e))?;
    let decoder = GzDecoder::new(BufReader::new(file));
    parse_listing(BufReader::new(decoder))
}

/// Parses an uncompressed listing stream into a [`ListingIndex`].
///
/// Lines are decoded lossily; the listing occasionally contains filenames
/// in arbitrary legacy encodings and those entries are never zip archives
/// we care about.
pub fn parse_listing<R: BufRead>(mut reader: R) -> Result<ListingIndex, ListingError> {
    let mut index = ListingIndex::default();
    let mut current_dir: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let bytes_read = reader
            .read_until(b'\n', &mut buf)
            .map_err(ListingError::read)?;
        if bytes_read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);

        if let Some(header) = line.strip_prefix("./") {
            let dir = header.strip_suffix(':').unwrap_or(header);
            current_dir = accept_directory(dir);
            continue;
        }

        let Some(dir) = current_dir.as_deref() else {
            continue;
        };
        let Some(filename) = match_zip_filename(line) else {
            continue;
        };
        let Some(id) = ebook_number(filename) else {
            continue;
        };

        // The listing is sorted, so the first zip seen for a number is the
        // preferred encoding variant. Later duplicates never replace it.
        if !index.filenames.contains_key(&id) {
            index.directories.insert(id, dir.to_string());
            index.filenames.insert(id, filename.to_string());
        }
    }

    Ok(index)
}

/// Decides whether a directory block should be indexed. Returns `None` for
/// skipped blocks so their file entries cannot attach to an earlier header.
fn accept_directory(dir: &str) -> Option<String> {
    if dir.ends_with("old") || dir.contains('-') {
        debug!(dir, "skipping directory block");
        return None;
    }
    Some(dir.to_string())
}

/// Finds the first ebook zip filename on an entry line, preferring the
/// UTF-8 (`-0`) variant, then the eight-bit (`-8`) variant, then plain.
fn match_zip_filename(line: &str) -> Option<&str> {
    for re in [&*ZIP_UTF8_RE, &*ZIP_EIGHT_BIT_RE, &*ZIP_PLAIN_RE] {
        if let Some(captures) = re.captures(line) {
            return captures.get(1).map(|m| m.as_str());
        }
    }
    None
}

fn ebook_number(filename: &str) -> Option<u32> {
    filename.split(['-', '.']).next()?.parse().ok()
}
