//! Status command handler: what the pipeline has produced so far.

use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::cli::Args;
use crate::library::Library;
use crate::manifest::Manifest;

pub fn run_status_command(cli: &Args) -> Result<()> {
    let settings = super::build_settings(cli, None, None)?;

    let manifest_path = Manifest::path_for(&settings.indexes_dir, &settings.language);
    if manifest_path.exists() {
        let manifest = Manifest::load(&manifest_path)?;
        println!(
            "manifest:         {} books ({})",
            manifest.len(),
            manifest_path.display()
        );
    } else {
        println!("manifest:         not built ({})", manifest_path.display());
    }

    println!(
        "zipped archives:  {}",
        count_by_extension(&settings.zipped_dir, "zip")
    );
    println!(
        "unzipped texts:   {}",
        count_by_extension(&settings.unzipped_dir, "txt")
    );

    let library = Library::scan(&settings.output_dir)?;
    println!("normalized books: {}", library.len());
    Ok(())
}

/// Files with the extension in a directory; a missing directory counts zero.
fn count_by_extension(dir: &Path, extension: &str) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .count()
}
