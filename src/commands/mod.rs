//! CLI command handlers.

mod fetch;
mod normalize;
mod pipeline;
mod status;
mod unpack;

pub use fetch::run_fetch_command;
pub use normalize::run_normalize_command;
pub use pipeline::run_pipeline_command;
pub use status::run_status_command;
pub use unpack::run_unpack_command;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::Args;
use crate::config::{Settings, load_config, validate_mirror_url};
use crate::failure::FailureLog;

/// Resolves the effective settings for a command: defaults, then the config
/// file, then CLI overrides.
fn build_settings(
    cli: &Args,
    language: Option<&str>,
    mirror: Option<&str>,
) -> Result<Settings> {
    let loaded = load_config(cli.config.as_deref())?;
    if loaded.loaded_from_file {
        debug!(path = ?loaded.path, "loaded config file");
    }

    let root = cli
        .root
        .clone()
        .or_else(|| {
            loaded
                .config
                .as_ref()
                .and_then(|config| config.root_dir.clone())
        })
        .unwrap_or_else(|| PathBuf::from("."));
    let mut settings = Settings::with_root(&root);
    if let Some(config) = &loaded.config {
        settings.apply_file_config(config);
    }

    if let Some(language) = language {
        settings.language = language.to_string();
    }
    if let Some(mirror) = mirror {
        validate_mirror_url(mirror)?;
        settings.set_mirror_url(mirror);
    }
    Ok(settings)
}

/// Logs every collected failure and a per-category count breakdown.
fn report_failures(failures: &FailureLog) {
    if failures.is_empty() {
        return;
    }
    for record in failures.records() {
        warn!(
            id = record.id,
            title = %record.title,
            category = record.category.label(),
            "{}",
            record.message
        );
    }
    for (category, count) in failures.counts_by_category() {
        info!(category = category.label(), count, "failures in category");
    }
}
