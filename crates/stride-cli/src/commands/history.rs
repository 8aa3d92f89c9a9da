//! History command implementation

use anyhow::Result;
use stride_engine::Engine;

use crate::cli::{GlobalArgs, HistoryArgs};
use crate::commands::common::{connect, load_migrations, load_project};

/// Execute the history command
pub(crate) async fn execute(_args: &HistoryArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let (set, graph) = load_migrations(&project)?;
    let db = connect(&project)?;

    let engine = Engine::new(&db, project.config.schema.clone());
    let entries = engine.history(&set, &graph).await?;

    if entries.is_empty() {
        println!("No migrations.");
        return Ok(());
    }

    for entry in &entries {
        let marker = if entry.applied { "x" } else { " " };
        let when = entry.applied_at.as_deref().unwrap_or("-");
        println!(
            "[{marker}] {id}  {format}  {when}  {message}",
            id = entry.id,
            format = entry.format,
            message = entry.message,
        );
    }
    Ok(())
}
