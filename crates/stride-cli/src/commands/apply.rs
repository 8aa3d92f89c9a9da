//! Apply command implementation

use anyhow::Result;
use stride_engine::Engine;

use crate::cli::{ApplyArgs, GlobalArgs};
use crate::commands::common::{connect, load_migrations, load_project};

/// Execute the apply command
pub(crate) async fn execute(_args: &ApplyArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let (set, graph) = load_migrations(&project)?;
    let db = connect(&project)?;

    let engine = Engine::new(&db, project.config.schema.clone());
    let applied = engine.apply(&set, &graph).await?;

    if applied.is_empty() {
        println!("Nothing to apply.");
        return Ok(());
    }
    for id in &applied {
        println!("  applied {id}");
    }
    println!(
        "Applied {} migration{}.",
        applied.len(),
        if applied.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
