//! Gutenmill Core Library
//!
//! This library turns a mirrored Project Gutenberg archive into a clean,
//! deduplicated per-book text corpus. It parses the mirror's two
//! semi-structured indexes into a manifest, resolves and fetches the
//! archive for every book of one language, and normalizes the raw texts
//! into metadata-tagged artifacts.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`index`] - Parsers for the title catalog and the directory listing
//! - [`manifest`] - The persisted id-to-title/language/location lookup
//! - [`fetch`] - URL resolution with naming variants and the download pass
//! - [`archive`] - Zip extraction for downloaded archives
//! - [`normalize`] - Body cleanup, metadata records, and the dedup pass
//! - [`library`] - Scan of already-normalized output artifacts
//! - [`config`] - Explicit settings plus the optional config file
//! - [`failure`] - End-of-run failure collection and classification

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod cli;
pub mod commands;
pub mod config;
pub mod failure;
pub mod fetch;
pub mod index;
pub mod library;
pub mod manifest;
pub mod normalize;

// Re-export commonly used types
pub use archive::{ArchiveError, extract_archive, extract_text_members};
pub use config::{DEFAULT_LANGUAGE, DEFAULT_MIRROR_URL, Settings};
pub use failure::{FailureCategory, FailureLog, classify_failure};
pub use fetch::{FetchError, FetchOutcome, FetchSummary, HttpClient, fetch_missing, select_books};
pub use index::{CatalogIndex, ListingIndex, parse_catalog, parse_listing, parse_listing_file};
pub use library::Library;
pub use manifest::{Manifest, ManifestError};
pub use normalize::{
    BookMeta, CleanedText, NormalizeError, NormalizeSummary, UNKNOWN_AUTHOR, UNKNOWN_LANGUAGE,
    UNKNOWN_TITLE, canonical_filename, clean_text, normalize_file, normalize_pass, split_title,
};
