//! Squash command implementation

use anyhow::{Context, Result};
use chrono::Local;
use std::collections::BTreeSet;
use std::fs;
use stride_core::{migration_path, rewrite_depends, MigrationId};
use stride_engine::Squasher;
use stride_sql::SqlParser;

use crate::cli::{GlobalArgs, SquashArgs};
use crate::commands::common::{backup_file, decider, load_migrations, load_project};

/// Execute the squash command
pub(crate) async fn execute(args: &SquashArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let (set, graph) = load_migrations(&project)?;

    let parser = SqlParser::from_dialect_name(&project.config.dialect)?;
    let squasher = Squasher::new(parser)
        .exclude(project.config.squash_exclude.iter().cloned())
        .annotate_source(args.source);

    let mut decider = decider(global);
    let date = Local::now().date_naive();
    let Some(outcome) = squasher.squash(&set, &graph, date, decider.as_mut())? else {
        println!("Fewer than two migrations are eligible; nothing to squash.");
        return Ok(());
    };

    for (id, reason) in &outcome.skipped {
        println!("  skipped {id} ({reason})");
    }

    let squash_path = migration_path(&project.migrations_dir, &outcome.id);
    fs::write(&squash_path, &outcome.content)
        .with_context(|| format!("Failed to write {}", squash_path.display()))?;
    println!("  wrote {}", squash_path.display());

    let consumed: BTreeSet<&str> = outcome.consumed.iter().map(|id| id.as_str()).collect();
    for id in &outcome.consumed {
        let path = migration_path(&project.migrations_dir, id);
        if args.backup {
            backup_file(&path)?;
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete {}", path.display()))?;
    }

    // Survivors that depended on a consumed migration now depend on the
    // squash instead.
    for migration in set.iter() {
        if consumed.contains(migration.id.as_str()) {
            continue;
        }
        if !migration.depends.iter().any(|d| consumed.contains(d.as_str())) {
            continue;
        }
        let mut depends: BTreeSet<MigrationId> = migration
            .depends
            .iter()
            .filter(|d| !consumed.contains(d.as_str()))
            .cloned()
            .collect();
        depends.insert(outcome.id.clone());

        if !migration.body.is_sql() {
            log::warn!(
                "dependent '{}' is a code migration; update its depends in code",
                migration.id
            );
            continue;
        }
        let path = migration_path(&project.migrations_dir, &migration.id);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if args.backup {
            backup_file(&path)?;
        }
        fs::write(&path, rewrite_depends(&content, &depends))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  rewired {}", migration.id);
    }

    println!(
        "Squashed {} migrations into '{}'.",
        outcome.consumed.len(),
        outcome.id
    );
    Ok(())
}

#[cfg(test)]
#[path = "squash_test.rs"]
mod tests;
