//! Validate command implementation - non-executing lint over migrations

use anyhow::Result;
use stride_sql::{lint_statements, SqlParser};

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::{load_migrations, load_project, ExitCode};

/// Execute the validate command
///
/// Lints every SQL migration body without touching a database. Findings go
/// to stdout; any finding makes the process exit 1.
pub(crate) async fn execute(_args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let (set, graph) = load_migrations(&project)?;

    let parser = SqlParser::from_dialect_name(&project.config.dialect)?;
    log::debug!("linting with the {} dialect", parser.dialect_name());
    let mut finding_count = 0;
    let mut checked = 0;

    for id in graph.topological_order()? {
        let Some(migration) = set.get(&id) else {
            continue;
        };
        let legs = [
            ("apply", migration.apply_statements()),
            ("rollback", migration.rollback_statements()),
        ];
        for (leg, statements) in legs {
            let Some(statements) = statements else {
                continue;
            };
            for finding in lint_statements(&parser, statements) {
                println!("{id} [{leg}] {finding}");
                finding_count += 1;
            }
        }
        checked += 1;
    }

    if finding_count > 0 {
        println!(
            "{finding_count} finding{} across {checked} migration{}.",
            if finding_count == 1 { "" } else { "s" },
            if checked == 1 { "" } else { "s" }
        );
        return Err(ExitCode(1).into());
    }
    println!(
        "{checked} migration{} checked, no findings.",
        if checked == 1 { "" } else { "s" }
    );
    Ok(())
}
