//! Scan of already-normalized output artifacts.
//!
//! Every artifact carries its metadata as the first line, so the whole
//! library can be rebuilt by reading one line per file. The normalize pass
//! consults the resulting bookno set to avoid reprocessing books that are
//! already in the output directory.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

use crate::normalize::record::BookMeta;

/// Metadata of every normalized book on disk, keyed by bookno.
#[derive(Debug, Default)]
pub struct Library {
    books: BTreeMap<String, BookMeta>,
}

impl Library {
    /// Builds the library by reading the header line of every `.txt` artifact
    /// in the output directory.
    ///
    /// A missing directory yields an empty library. Files whose header line
    /// cannot be read or parsed are skipped with a warning; they will be
    /// treated as absent and rewritten by the next normalize pass.
    pub fn scan(output_dir: &Path) -> io::Result<Self> {
        let mut library = Self::default();
        let entries = match fs::read_dir(output_dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(dir = %output_dir.display(), "no output directory yet; library is empty");
                return Ok(library);
            }
            Err(error) => return Err(error),
        };

        for entry in entries {
            let path = entry?.path();
            if !is_artifact(&path) {
                continue;
            }
            match read_header(&path) {
                Ok(meta) => {
                    library.books.insert(meta.bookno.clone(), meta);
                }
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "skipping unreadable artifact");
                }
            }
        }
        Ok(library)
    }

    /// Whether a book with this bookno is already normalized.
    #[must_use]
    pub fn contains(&self, bookno: &str) -> bool {
        self.books.contains_key(bookno)
    }

    /// Metadata of an already-normalized book, if present.
    #[must_use]
    pub fn get(&self, bookno: &str) -> Option<&BookMeta> {
        self.books.get(bookno)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

fn is_artifact(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

/// Reads and parses the first line of an artifact.
fn read_header(path: &Path) -> anyhow::Result<BookMeta> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut header = String::new();
    BufReader::new(file)
        .read_line(&mut header)
        .with_context(|| format!("failed to read header of {}", path.display()))?;
    BookMeta::from_header_line(header.trim_end())
        .with_context(|| format!("invalid artifact header in {}", path.display()))
}
