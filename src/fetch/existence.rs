//! Local artifact probe deciding whether a fetch can be skipped.
//!
//! A book already on disk in any encoding variant, zipped or extracted,
//! never triggers a download. This is what makes interrupted runs cheap to
//! re-run.

use std::path::{Path, PathBuf};

use super::variants::base_stem;

/// Returns the first artifact already present for an archive filename.
///
/// Probes every combination of directory (`zipped_dir`, `unzipped_dir`),
/// extension (`.zip`, `.txt`) and variant suffix against the marker-free
/// stem of `filename`.
#[must_use]
pub fn existing_artifact(
    zipped_dir: &Path,
    unzipped_dir: &Path,
    filename: &str,
    variant_suffixes: &[String],
) -> Option<PathBuf> {
    let stem = base_stem(filename);
    for dir in [zipped_dir, unzipped_dir] {
        for ext in [".zip", ".txt"] {
            for suffix in variant_suffixes {
                let candidate = dir.join(format!("{stem}{suffix}{ext}"));
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }
    }
    None
}
