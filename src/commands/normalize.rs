//! Normalize command handler: the cleanup and dedup pass.

use std::fs;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::{Args, NormalizeArgs};
use crate::config::Settings;
use crate::library::Library;
use crate::manifest::Manifest;
use crate::normalize::normalize_pass;

pub fn run_normalize_command(cli: &Args, args: &NormalizeArgs) -> Result<()> {
    let mut settings = super::build_settings(cli, args.language.as_deref(), None)?;
    if args.accept_unknown_language {
        settings.accept_unknown_language = true;
    }
    normalize_books(&settings)
}

/// Runs the normalize pass against prepared settings.
pub(super) fn normalize_books(settings: &Settings) -> Result<()> {
    fs::create_dir_all(&settings.output_dir).with_context(|| {
        format!(
            "Failed to create directory '{}'",
            settings.output_dir.display()
        )
    })?;

    let manifest_path = Manifest::path_for(&settings.indexes_dir, &settings.language);
    if !manifest_path.exists() {
        bail!(
            "No manifest at '{}'; run the fetch command first to build it",
            manifest_path.display()
        );
    }
    let manifest = Manifest::load(&manifest_path)?;

    let library = Library::scan(&settings.output_dir).with_context(|| {
        format!(
            "Failed to scan output directory '{}'",
            settings.output_dir.display()
        )
    })?;
    info!(books = library.len(), "library scanned");

    let summary = normalize_pass(&manifest, &library, settings)?;
    info!(
        scanned = summary.scanned,
        normalized = summary.normalized,
        skipped_in_library = summary.skipped_in_library,
        skipped_language = summary.skipped_language,
        failed = summary.failed,
        "normalize pass complete"
    );
    Ok(())
}
