//! The persisted manifest joining both indexes into one lookup table.
//!
//! A manifest is built per target language and cached as JSON next to the
//! raw index files. Deleting the file forces a rebuild from the indexes on
//! the next run; nothing ever mutates a manifest in place.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::index::{CatalogIndex, ListingIndex};

/// Errors that can occur while loading or persisting a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("Failed to read manifest '{path}': {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest file held invalid JSON.
    #[error("Failed to parse manifest '{path}': {source}")]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The manifest could not be serialized.
    #[error("Failed to serialize manifest: {source}")]
    Serialize {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The manifest file could not be written.
    #[error("Failed to write manifest '{path}': {source}")]
    Write {
        /// Path that failed to write.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ManifestError {
    fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    fn parse(path: &Path, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            source,
        }
    }

    fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Unified per-ebook lookup table built from the catalog and the listing.
///
/// The serialized field names are the historical ones; manifests written by
/// earlier tooling stay loadable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Ebook number to title, from the catalog.
    pub ebooks: BTreeMap<u32, String>,
    /// Ebook number to language. Keys are a subset of `ebooks`.
    #[serde(rename = "ebookslanguage")]
    pub languages: BTreeMap<u32, String>,
    /// Ebook number to mirror directory. Keys are a subset of `ebooks`.
    #[serde(rename = "mirrordir")]
    pub directories: BTreeMap<u32, String>,
    /// Ebook number to zip filename. Keys are a subset of `ebooks`.
    #[serde(rename = "mirrorname")]
    pub filenames: BTreeMap<u32, String>,
}

impl Manifest {
    /// Joins the two indexes. Location and language entries whose number is
    /// absent from the catalog are dropped, so every manifest key set is a
    /// subset of `ebooks`.
    #[must_use]
    pub fn assemble(catalog: CatalogIndex, listing: ListingIndex) -> Self {
        let known: BTreeSet<u32> = catalog.titles.keys().copied().collect();

        let mut languages = catalog.languages;
        languages.retain(|id, _| known.contains(id));
        let mut directories = listing.directories;
        directories.retain(|id, _| known.contains(id));
        let mut filenames = listing.filenames;
        filenames.retain(|id, _| known.contains(id));

        Self {
            ebooks: catalog.titles,
            languages,
            directories,
            filenames,
        }
    }

    /// Number of cataloged ebooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ebooks.len()
    }

    /// Returns `true` when the manifest holds no ebooks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ebooks.is_empty()
    }

    /// Title for an ebook number, if cataloged.
    #[must_use]
    pub fn title(&self, id: u32) -> Option<&str> {
        self.ebooks.get(&id).map(String::as_str)
    }

    /// Language for an ebook number, if the catalog recorded one.
    #[must_use]
    pub fn language(&self, id: u32) -> Option<&str> {
        self.languages.get(&id).map(String::as_str)
    }

    /// Mirror directory for an ebook number, if the listing located it.
    #[must_use]
    pub fn directory(&self, id: u32) -> Option<&str> {
        self.directories.get(&id).map(String::as_str)
    }

    /// Zip filename for an ebook number, if the listing located it.
    #[must_use]
    pub fn filename(&self, id: u32) -> Option<&str> {
        self.filenames.get(&id).map(String::as_str)
    }

    /// Manifest path for a target language, inside the indexes directory.
    #[must_use]
    pub fn path_for(indexes_dir: &Path, language: &str) -> PathBuf {
        indexes_dir.join(format!("manifest-{}.json", language.to_lowercase()))
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let raw = fs::read_to_string(path).map_err(|e| ManifestError::read(path, e))?;
        serde_json::from_str(&raw).map_err(|e| ManifestError::parse(path, e))
    }

    /// Persists the manifest as pretty-printed JSON.
    pub fn store(&self, path: &Path) -> Result<(), ManifestError> {
        let json =
            serde_json::to_string_pretty(self).map_err(|source| ManifestError::Serialize { source })?;
        fs::write(path, json).map_err(|e| ManifestError::write(path, e))
    }

    /// Loads the manifest at `path`, or builds one with `build`, persists
    /// it, and returns it.
    pub fn load_or_build<E, F>(path: &Path, build: F) -> Result<Self, E>
    where
        F: FnOnce() -> Result<Self, E>,
        E: From<ManifestError>,
    {
        if path.exists() {
            let manifest = Self::load(path)?;
            debug!(path = %path.display(), entries = manifest.len(), "loaded persisted manifest");
            return Ok(manifest);
        }
        let manifest = build()?;
        manifest.store(path)?;
        debug!(path = %path.display(), entries = manifest.len(), "assembled and persisted manifest");
        Ok(manifest)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_catalog() -> CatalogIndex {
        let mut catalog = CatalogIndex::default();
        catalog.titles.insert(100, "Book One, by One".to_string());
        catalog.titles.insert(200, "Book Two, by Two".to_string());
        catalog.languages.insert(100, "English".to_string());
        catalog
    }

    fn sample_listing() -> ListingIndex {
        let mut listing = ListingIndex::default();
        listing.directories.insert(100, "1/0/0/100".to_string());
        listing.filenames.insert(100, "100-0.zip".to_string());
        // 300 is on the mirror but not in the catalog.
        listing.directories.insert(300, "3/0/0/300".to_string());
        listing.filenames.insert(300, "300.zip".to_string());
        listing
    }

    // ==================== Assembly Tests ====================

    #[test]
    fn test_assemble_joins_catalog_and_listing() {
        let manifest = Manifest::assemble(sample_catalog(), sample_listing());
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.title(100), Some("Book One, by One"));
        assert_eq!(manifest.language(100), Some("English"));
        assert_eq!(manifest.directory(100), Some("1/0/0/100"));
        assert_eq!(manifest.filename(100), Some("100-0.zip"));
    }

    #[test]
    fn test_assemble_drops_uncataloged_locations() {
        let manifest = Manifest::assemble(sample_catalog(), sample_listing());
        assert!(manifest.directory(300).is_none());
        assert!(manifest.filename(300).is_none());
    }

    #[test]
    fn test_assemble_cataloged_book_without_location_keeps_title() {
        let manifest = Manifest::assemble(sample_catalog(), sample_listing());
        assert_eq!(manifest.title(200), Some("Book Two, by Two"));
        assert!(manifest.directory(200).is_none());
    }

    // ==================== Persistence Tests ====================

    #[test]
    fn test_store_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest-english.json");

        let manifest = Manifest::assemble(sample_catalog(), sample_listing());
        manifest.store(&path).unwrap();
        let reloaded = Manifest::load(&path).unwrap();
        assert_eq!(reloaded, manifest);
    }

    #[test]
    fn test_serialized_manifest_uses_legacy_field_names() {
        let manifest = Manifest::assemble(sample_catalog(), sample_listing());
        let json = serde_json::to_string_pretty(&manifest).unwrap();
        assert!(json.contains("\"ebooks\""));
        assert!(json.contains("\"ebookslanguage\""));
        assert!(json.contains("\"mirrordir\""));
        assert!(json.contains("\"mirrorname\""));
        // Map keys are ebook numbers encoded as JSON strings.
        assert!(json.contains("\"100\""));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest-english.json");
        fs::write(&path, "{not json").unwrap();

        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let err = Manifest::load(Path::new("/nonexistent/manifest.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }

    // ==================== Caching Tests ====================

    #[test]
    fn test_load_or_build_persists_fresh_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest-english.json");

        let built = Manifest::load_or_build::<ManifestError, _>(&path, || {
            Ok(Manifest::assemble(sample_catalog(), sample_listing()))
        })
        .unwrap();
        assert!(path.exists());
        assert_eq!(built.len(), 2);
    }

    #[test]
    fn test_load_or_build_prefers_persisted_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest-english.json");

        let original = Manifest::assemble(sample_catalog(), sample_listing());
        original.store(&path).unwrap();

        let loaded = Manifest::load_or_build::<ManifestError, _>(&path, || {
            panic!("build must not run when a manifest is persisted")
        })
        .unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_path_for_lowercases_language() {
        let path = Manifest::path_for(Path::new("/data/indexes"), "French");
        assert_eq!(path, PathBuf::from("/data/indexes/manifest-french.json"));
    }
}
