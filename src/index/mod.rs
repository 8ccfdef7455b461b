//! Parsers for the two mirror-wide index files.
//!
//! The mirror publishes a human-oriented catalog (`GUTINDEX.ALL`) mapping
//! ebook numbers to titles and languages, and a recursive directory listing
//! (`ls-lR`) locating the zip archive for each ebook number. Both parsers
//! are line oriented and tolerate the malformed entries both files are known
//! to contain.

pub mod catalog;
pub mod listing;

pub use catalog::{CatalogIndex, parse_catalog};
pub use listing::{ListingError, ListingIndex, parse_listing, parse_listing_file};
