//! Fetch command handler: indexes, manifest, and the archive download pass.

use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::archive::extract_archive;
use crate::cli::{Args, FetchArgs};
use crate::config::Settings;
use crate::fetch::{HttpClient, fetch_missing};
use crate::index::{parse_catalog, parse_listing_file};
use crate::manifest::Manifest;

/// Compressed catalog index on the mirror, holding [`CATALOG_FILENAME`].
const CATALOG_ARCHIVE: &str = "GUTINDEX.zip";
/// Extracted catalog index.
const CATALOG_FILENAME: &str = "GUTINDEX.ALL";
/// Gzip-compressed directory listing on the mirror, parsed as-is.
const LISTING_FILENAME: &str = "ls-lR.gz";

pub async fn run_fetch_command(cli: &Args, args: &FetchArgs) -> Result<()> {
    let settings = super::build_settings(cli, args.language.as_deref(), args.mirror.as_deref())?;
    fetch_books(&settings, args.download_limit(), cli.quiet).await
}

/// Runs the full fetch stage against prepared settings.
pub(super) async fn fetch_books(
    settings: &Settings,
    limit: Option<usize>,
    quiet: bool,
) -> Result<()> {
    for dir in [
        &settings.indexes_dir,
        &settings.zipped_dir,
        &settings.unzipped_dir,
    ] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory '{}'", dir.display()))?;
    }

    let client = HttpClient::new_with_timeouts(
        settings.connect_timeout_secs,
        settings.read_timeout_secs,
    );
    ensure_indexes(&client, settings).await?;

    let manifest_path = Manifest::path_for(&settings.indexes_dir, &settings.language);
    let manifest = Manifest::load_or_build(&manifest_path, || build_manifest(settings))?;
    info!(books = manifest.len(), language = %settings.language, "manifest ready");

    let progress = (!quiet).then(make_spinner);
    let outcome = fetch_missing(&client, &manifest, settings, limit, progress.as_ref()).await;
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    super::report_failures(&outcome.failures);
    let summary = outcome.summary;
    info!(
        requested = summary.requested,
        downloaded = summary.downloaded,
        skipped_existing = summary.skipped_existing,
        skipped_unlocated = summary.skipped_unlocated,
        failed = summary.failed,
        "fetch pass complete"
    );
    Ok(())
}

/// Downloads and unpacks the two raw indexes when they are not on disk yet.
/// Delete the files to force a refresh.
async fn ensure_indexes(client: &HttpClient, settings: &Settings) -> Result<()> {
    let catalog_path = settings.indexes_dir.join(CATALOG_FILENAME);
    if !catalog_path.exists() {
        let archive_path = settings.indexes_dir.join(CATALOG_ARCHIVE);
        if !archive_path.exists() {
            let url = format!("{}{}", settings.mirror_url, CATALOG_ARCHIVE);
            info!(url = %url, "downloading catalog index");
            client
                .download_to_path(&url, &archive_path)
                .await
                .with_context(|| format!("Failed to download catalog index from {url}"))?;
        }
        info!(archive = %archive_path.display(), "extracting catalog index");
        extract_archive(&archive_path, &settings.indexes_dir)
            .context("Failed to extract catalog index")?;
    }

    let listing_path = settings.indexes_dir.join(LISTING_FILENAME);
    if !listing_path.exists() {
        let url = format!("{}{}", settings.mirror_url, LISTING_FILENAME);
        info!(url = %url, "downloading directory listing");
        client
            .download_to_path(&url, &listing_path)
            .await
            .with_context(|| format!("Failed to download directory listing from {url}"))?;
    }
    Ok(())
}

/// Parses both raw indexes into a fresh manifest.
fn build_manifest(settings: &Settings) -> Result<Manifest> {
    let catalog_path = settings.indexes_dir.join(CATALOG_FILENAME);
    info!(path = %catalog_path.display(), "parsing catalog index");
    let raw = fs::read(&catalog_path)
        .with_context(|| format!("Failed to read catalog index '{}'", catalog_path.display()))?;
    let catalog = parse_catalog(&String::from_utf8_lossy(&raw));
    info!(
        titles = catalog.len(),
        skipped_lines = catalog.skipped_lines,
        "catalog index parsed"
    );

    let listing_path = settings.indexes_dir.join(LISTING_FILENAME);
    info!(path = %listing_path.display(), "parsing directory listing");
    let listing = parse_listing_file(&listing_path)?;
    info!(archives = listing.len(), "directory listing parsed");

    Ok(Manifest::assemble(catalog, listing))
}

fn make_spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
