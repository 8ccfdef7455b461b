//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Fetch, unpack, and normalize a mirrored Project Gutenberg archive.
///
/// gutenmill parses the mirror's catalog and directory indexes into a
/// manifest, downloads the archives for one language, and cleans the raw
/// texts into deduplicated book files with embedded metadata.
#[derive(Parser, Debug)]
#[command(name = "gutenmill")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: $XDG_CONFIG_HOME/gutenmill/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base directory for the index, archive, and output directories
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download the indexes, build the manifest, and fetch missing archives
    Fetch(FetchArgs),
    /// Extract the text from every downloaded archive
    Unpack,
    /// Clean and deduplicate unpacked texts into the output library
    Normalize(NormalizeArgs),
    /// Fetch, unpack, and normalize in one pass
    Run(RunArgs),
    /// Show manifest and directory counts
    Status,
}

#[derive(clap::Args, Debug, Default)]
pub struct FetchArgs {
    /// Catalog language of the books to fetch
    #[arg(long, value_name = "LANGUAGE")]
    pub language: Option<String>,

    /// Mirror root URL
    #[arg(long, value_name = "URL")]
    pub mirror: Option<String>,

    /// Stop after this many new downloads (0 = no limit)
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub limit: usize,
}

impl FetchArgs {
    /// The download limit as an option, zero meaning unlimited.
    #[must_use]
    pub fn download_limit(&self) -> Option<usize> {
        (self.limit > 0).then_some(self.limit)
    }
}

#[derive(clap::Args, Debug, Default)]
pub struct NormalizeArgs {
    /// Catalog language of the books to normalize
    #[arg(long, value_name = "LANGUAGE")]
    pub language: Option<String>,

    /// Normalize books regardless of their catalog language
    #[arg(long)]
    pub accept_unknown_language: bool,
}

#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// Catalog language of the books to process
    #[arg(long, value_name = "LANGUAGE")]
    pub language: Option<String>,

    /// Mirror root URL
    #[arg(long, value_name = "URL")]
    pub mirror: Option<String>,

    /// Stop after this many new downloads (0 = no limit)
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub limit: usize,

    /// Normalize books regardless of their catalog language
    #[arg(long)]
    pub accept_unknown_language: bool,
}

impl RunArgs {
    /// The download limit as an option, zero meaning unlimited.
    #[must_use]
    pub fn download_limit(&self) -> Option<usize> {
        (self.limit > 0).then_some(self.limit)
    }
}
