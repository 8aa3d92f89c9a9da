//! Remove command implementation - splices a migration out of the chain

use anyhow::{Context, Result};
use std::fs;
use stride_core::{migration_path, rewrite_depends};

use crate::cli::{GlobalArgs, RemoveArgs};
use crate::commands::common::{backup_file, load_migrations, load_project};

/// Execute the remove command
///
/// Dependents of the removed migration inherit its dependencies, so the
/// chain stays connected. Each touched file can be kept as `.bak`.
pub(crate) async fn execute(args: &RemoveArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let (set, mut graph) = load_migrations(&project)?;

    let migration = set
        .get(&args.id)
        .ok_or_else(|| anyhow::anyhow!("no migration with id '{}'", args.id))?;
    if !migration.body.is_sql() {
        anyhow::bail!(
            "'{}' is a code migration; remove its registration instead",
            args.id
        );
    }

    let rewrites = graph.remove(&args.id)?;
    let removed_path = migration_path(&project.migrations_dir, &migration.id);

    for (dependent_id, depends) in &rewrites {
        let dependent = set.get(dependent_id).ok_or_else(|| {
            anyhow::anyhow!("graph id '{dependent_id}' is missing from the loaded set")
        })?;
        if !dependent.body.is_sql() {
            log::warn!("dependent '{dependent_id}' is a code migration; update its depends in code");
            continue;
        }

        let path = migration_path(&project.migrations_dir, dependent_id);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if args.backup {
            backup_file(&path)?;
        }
        fs::write(&path, rewrite_depends(&content, depends))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  rewired {dependent_id}");
    }

    if args.backup {
        backup_file(&removed_path)?;
    }
    fs::remove_file(&removed_path)
        .with_context(|| format!("Failed to delete {}", removed_path.display()))?;

    println!(
        "Removed '{}' and rewired {} dependent{}.",
        args.id,
        rewrites.len(),
        if rewrites.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

#[cfg(test)]
#[path = "remove_test.rs"]
mod tests;
