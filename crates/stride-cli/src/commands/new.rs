//! New command implementation - writes a fresh migration file

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::fs;
use std::path::Path;
use stride_core::{make_filename, render_template};

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::{load_migrations, load_project};

/// Execute the new command
pub(crate) async fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let (_, graph) = load_migrations(&project)?;

    // A migration chain with more than one head has no well-defined parent;
    // default_head refuses rather than guessing.
    let head = graph.default_head()?;
    let depends: Vec<_> = head.into_iter().collect();

    let date = Local::now().date_naive();
    let sequence = next_sequence(&project.migrations_dir, date)?;
    let filename = make_filename(&args.message, sequence, date);
    let path = project.migrations_dir.join(&filename);

    let content = render_template(&args.message, &depends);
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Created {}", path.display());
    if let Some(parent) = depends.first() {
        println!("  depends: {parent}");
    }
    Ok(())
}

/// Next free sequence number for migrations created on `date`.
///
/// Scans existing `{YYYYMMDD}_{NN}-...` file names for the same day and
/// returns max + 1, so removing a file never reissues its number.
fn next_sequence(dir: &Path, date: NaiveDate) -> Result<u32> {
    let prefix = format!("{}_", date.format("%Y%m%d"));
    let mut max = 0;

    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok())
    {
        let name = entry.file_name();
        let Some(rest) = name.to_str().and_then(|n| n.strip_prefix(&prefix)) else {
            continue;
        };
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(sequence) = digits.parse::<u32>() {
            max = max.max(sequence);
        }
    }
    Ok(max + 1)
}

#[cfg(test)]
#[path = "new_test.rs"]
mod tests;
