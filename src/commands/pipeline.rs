//! Run command handler: fetch, unpack, and normalize in one pass.

use anyhow::Result;
use tracing::info;

use crate::cli::{Args, RunArgs};

pub async fn run_pipeline_command(cli: &Args, args: &RunArgs) -> Result<()> {
    let mut settings = super::build_settings(cli, args.language.as_deref(), args.mirror.as_deref())?;
    if args.accept_unknown_language {
        settings.accept_unknown_language = true;
    }

    info!(stage = "fetch", "pipeline stage starting");
    super::fetch::fetch_books(&settings, args.download_limit(), cli.quiet).await?;
    info!(stage = "unpack", "pipeline stage starting");
    super::unpack::unpack_archives(&settings)?;
    info!(stage = "normalize", "pipeline stage starting");
    super::normalize::normalize_books(&settings)?;
    info!("pipeline complete");
    Ok(())
}
