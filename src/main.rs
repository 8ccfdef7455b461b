//! CLI entry point for the gutenmill tool.

use anyhow::Result;
use clap::Parser;
use gutenmill_core::cli::{Args, Command};
use gutenmill_core::commands;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    match &args.command {
        Command::Fetch(fetch_args) => commands::run_fetch_command(&args, fetch_args).await,
        Command::Unpack => commands::run_unpack_command(&args),
        Command::Normalize(normalize_args) => commands::run_normalize_command(&args, normalize_args),
        Command::Run(run_args) => commands::run_pipeline_command(&args, run_args).await,
        Command::Status => commands::run_status_command(&args),
    }
}
