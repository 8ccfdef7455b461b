//! Zip extraction for downloaded archives.
//!
//! Ebook archives often nest their text under a member directory; members
//! are flattened into the destination so one directory holds every raw
//! text. Damaged archives are reported per file and never abort a pass.

use std::ffi::OsStr;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while extracting an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive file could not be opened.
    #[error("IO error opening {path}: {source}")]
    Open {
        /// Archive that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The archive is damaged or not a zip file.
    #[error("corrupt archive {path}: {source}")]
    Corrupt {
        /// Archive that failed to parse.
        path: PathBuf,
        /// Underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// An extracted member could not be written.
    #[error("IO error extracting {path}: {source}")]
    Io {
        /// Destination path that failed to write.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    fn open(path: &Path, source: io::Error) -> Self {
        Self::Open {
            path: path.to_path_buf(),
            source,
        }
    }

    fn corrupt(path: &Path, source: zip::result::ZipError) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            source,
        }
    }

    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Extracts every file member of the archive into the destination
/// directory, flattened. Returns the extracted paths.
pub fn extract_archive(
    archive_path: &Path,
    dest_dir: &Path,
) -> Result<Vec<PathBuf>, ArchiveError> {
    extract_members(archive_path, dest_dir, |_| true)
}

/// Extracts only `.txt` members of the archive, flattened. Ebook zips can
/// carry images and HTML alongside the text; only the text is wanted.
pub fn extract_text_members(
    archive_path: &Path,
    dest_dir: &Path,
) -> Result<Vec<PathBuf>, ArchiveError> {
    extract_members(archive_path, dest_dir, |name| {
        Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
    })
}

fn extract_members(
    archive_path: &Path,
    dest_dir: &Path,
    keep: impl Fn(&OsStr) -> bool,
) -> Result<Vec<PathBuf>, ArchiveError> {
    let file = File::open(archive_path).map_err(|error| ArchiveError::open(archive_path, error))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|error| ArchiveError::corrupt(archive_path, error))?;

    let mut extracted = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|error| ArchiveError::corrupt(archive_path, error))?;
        if entry.is_dir() {
            continue;
        }
        // Flatten: drop any member directory prefix, keep the file name.
        let Some(name) = entry
            .enclosed_name()
            .and_then(Path::file_name)
            .map(OsStr::to_os_string)
        else {
            warn!(
                archive = %archive_path.display(),
                member = entry.name(),
                "member has no safe name; skipping"
            );
            continue;
        };
        if !keep(&name) {
            debug!(
                archive = %archive_path.display(),
                member = %name.to_string_lossy(),
                "member filtered"
            );
            continue;
        }

        let dest = dest_dir.join(&name);
        let mut out = File::create(&dest).map_err(|error| ArchiveError::io(&dest, error))?;
        io::copy(&mut entry, &mut out).map_err(|error| ArchiveError::io(&dest, error))?;
        extracted.push(dest);
    }
    Ok(extracted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn write_zip(path: &Path, members: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, body) in members {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(body).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_extract_archive_extracts_all_members() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(&archive, &[("GUTINDEX.ALL", b"catalog"), ("notes.md", b"notes")]);

        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let extracted = extract_archive(&archive, &out).unwrap();

        assert_eq!(extracted.len(), 2);
        assert_eq!(std::fs::read(out.join("GUTINDEX.ALL")).unwrap(), b"catalog");
        assert_eq!(std::fs::read(out.join("notes.md")).unwrap(), b"notes");
    }

    #[test]
    fn test_extract_text_members_filters_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("100-0.zip");
        write_zip(
            &archive,
            &[("100-0.txt", b"the text"), ("cover.jpg", b"\xff\xd8")],
        );

        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let extracted = extract_text_members(&archive, &out).unwrap();

        assert_eq!(extracted, vec![out.join("100-0.txt")]);
        assert!(out.join("100-0.txt").exists());
        assert!(!out.join("cover.jpg").exists());
    }

    #[test]
    fn test_extract_flattens_nested_members() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("200.zip");
        write_zip(&archive, &[("200/extra/200.txt", b"nested text")]);

        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let extracted = extract_text_members(&archive, &out).unwrap();

        assert_eq!(extracted, vec![out.join("200.txt")]);
        assert_eq!(std::fs::read(out.join("200.txt")).unwrap(), b"nested text");
    }

    #[test]
    fn test_extract_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("100.zip");
        write_zip(&archive, &[("100.txt", b"fresh")]);

        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("100.txt"), b"stale").unwrap();

        extract_text_members(&archive, &out).unwrap();
        assert_eq!(std::fs::read(out.join("100.txt")).unwrap(), b"fresh");
    }

    #[test]
    fn test_extract_corrupt_archive_errors() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bad.zip");
        std::fs::write(&archive, b"this is not a zip file").unwrap();

        let error = extract_archive(&archive, dir.path()).unwrap_err();
        assert!(matches!(error, ArchiveError::Corrupt { .. }));
        assert!(error.to_string().contains("corrupt archive"));
    }

    #[test]
    fn test_extract_missing_archive_errors() {
        let dir = tempfile::tempdir().unwrap();
        let error = extract_archive(&dir.path().join("absent.zip"), dir.path()).unwrap_err();
        assert!(matches!(error, ArchiveError::Open { .. }));
    }
}
