//! Per-book metadata record and canonical output naming.
//!
//! Every normalized artifact starts with a single JSON line describing the
//! book, followed by the body. The record keys are stable so downstream
//! consumers and the dedup scan can parse artifacts from any run.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::fetch::variants::base_stem;

/// Author recorded when a catalog title has no `, by ` separator.
pub const UNKNOWN_AUTHOR: &str = "UNKNOWN_AUTHOR";
/// Title recorded for books the catalog does not list.
pub const UNKNOWN_TITLE: &str = "UNKNOWN_TITLE";

#[allow(clippy::expect_used)]
static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("non-word regex is valid"));

/// Metadata header of a normalized book artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMeta {
    /// Title part of the catalog entry.
    pub title: String,
    /// Author part of the catalog entry, or [`UNKNOWN_AUTHOR`].
    pub author: String,
    /// Source text filename in the unzipped directory.
    pub filename: String,
    /// Ebook number as a marker-free filename stem, kept as text.
    pub bookno: String,
}

impl BookMeta {
    /// Builds a record from a catalog title and the source filename.
    #[must_use]
    pub fn from_catalog(raw_title: &str, source_filename: &str) -> Self {
        let (title, author) = split_title(raw_title);
        Self {
            title: title.to_string(),
            author: author.to_string(),
            filename: source_filename.to_string(),
            bookno: base_stem(source_filename),
        }
    }

    /// Serializes the record as the single-line JSON artifact header.
    pub fn to_header_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses an artifact header line back into a record.
    pub fn from_header_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Splits a catalog title into `(title, author)` on the first `, by `.
/// Entries without the separator keep the whole string as the title.
#[must_use]
pub fn split_title(raw_title: &str) -> (&str, &str) {
    match raw_title.split_once(", by ") {
        Some((title, author)) => (title, author),
        None => (raw_title, UNKNOWN_AUTHOR),
    }
}

/// Output filename derived from a title: lowercased, truncated to 100
/// characters, runs of non-word characters collapsed to single underscores,
/// `.txt` appended. Collisions are intended; identical titles dedup to one
/// file. An empty title falls back to [`UNKNOWN_TITLE`].
#[must_use]
pub fn canonical_filename(title: &str) -> String {
    let title = if title.is_empty() { UNKNOWN_TITLE } else { title };
    let truncated: String = title.to_lowercase().chars().take(100).collect();
    format!("{}.txt", NON_WORD_RE.replace_all(&truncated, "_"))
}
