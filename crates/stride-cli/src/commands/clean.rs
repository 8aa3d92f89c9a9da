//! Clean command implementation - deletes .bak files

use anyhow::{Context, Result};
use std::fs;

use crate::cli::{CleanArgs, GlobalArgs};
use crate::commands::common::load_project;

/// Execute the clean command
pub(crate) async fn execute(_args: &CleanArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let dir = &project.migrations_dir;

    let mut removed = 0;
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().map(|ext| ext != "bak").unwrap_or(true) {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                println!("  removed {}", path.display());
                removed += 1;
            }
            Err(e) => eprintln!("  failed to remove {}: {e}", path.display()),
        }
    }

    println!(
        "Removed {removed} backup file{}.",
        if removed == 1 { "" } else { "s" }
    );
    Ok(())
}

#[cfg(test)]
#[path = "clean_test.rs"]
mod tests;
