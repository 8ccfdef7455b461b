//! Unpack command handler: extract the text from every downloaded archive.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::archive::extract_text_members;
use crate::cli::Args;
use crate::config::Settings;
use crate::failure::FailureLog;
use crate::fetch::variants::base_stem;

pub fn run_unpack_command(cli: &Args) -> Result<()> {
    let settings = super::build_settings(cli, None, None)?;
    unpack_archives(&settings)
}

/// Extracts the text members of every zip in the zipped directory.
///
/// Archives whose text is already unzipped in any variant form are skipped,
/// so re-runs only touch new downloads. Damaged archives are collected and
/// reported at the end; the pass never stops on one.
pub(super) fn unpack_archives(settings: &Settings) -> Result<()> {
    fs::create_dir_all(&settings.unzipped_dir).with_context(|| {
        format!(
            "Failed to create directory '{}'",
            settings.unzipped_dir.display()
        )
    })?;

    let archives = zip_archives(&settings.zipped_dir)?;
    let total = archives.len();
    let mut extracted = 0_usize;
    let mut skipped = 0_usize;
    let mut failures = FailureLog::new();

    for (position, path) in archives.iter().enumerate() {
        let position = position + 1;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let stem = base_stem(&filename);

        if text_already_unzipped(settings, &stem) {
            debug!(archive = %filename, "text already unzipped; skipping");
            skipped += 1;
            continue;
        }

        match extract_text_members(path, &settings.unzipped_dir) {
            Ok(members) => {
                info!(
                    position,
                    total,
                    archive = %filename,
                    texts = members.len(),
                    "extracted archive"
                );
                extracted += 1;
            }
            Err(error) => {
                warn!(position, total, archive = %filename, %error, "extraction failed");
                failures.record(stem.parse().unwrap_or(0), "", error.to_string());
            }
        }
    }

    super::report_failures(&failures);
    info!(
        archives = total,
        extracted,
        skipped,
        failed = failures.len(),
        "unpack pass complete"
    );
    Ok(())
}

/// Whether any variant of this stem is already extracted.
fn text_already_unzipped(settings: &Settings, stem: &str) -> bool {
    settings.variant_suffixes.iter().any(|suffix| {
        settings
            .unzipped_dir
            .join(format!("{stem}{suffix}.txt"))
            .exists()
    })
}

/// Zip archives in the zipped directory, in sorted order. A missing
/// directory means nothing was fetched yet.
fn zip_archives(zipped_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(zipped_dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %zipped_dir.display(), "no zipped directory; nothing to unpack");
            return Ok(Vec::new());
        }
        Err(error) => {
            return Err(error)
                .with_context(|| format!("Failed to scan '{}'", zipped_dir.display()));
        }
    };

    let mut archives = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to scan '{}'", zipped_dir.display()))?
            .path();
        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if is_zip {
            archives.push(path);
        }
    }
    archives.sort();
    Ok(archives)
}
