//! Mark command implementation

use anyhow::Result;
use stride_engine::Engine;

use crate::cli::{GlobalArgs, MarkArgs};
use crate::commands::common::{connect, decider, load_migrations, load_project};

/// Execute the mark command
pub(crate) async fn execute(_args: &MarkArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let (set, graph) = load_migrations(&project)?;
    let db = connect(&project)?;

    let mut decider = decider(global);
    let engine = Engine::new(&db, project.config.schema.clone());
    let marked = engine.mark(&set, &graph, decider.as_mut()).await?;

    if marked.is_empty() {
        println!("Nothing marked.");
        return Ok(());
    }
    for id in &marked {
        println!("  marked {id}");
    }
    println!(
        "Marked {} migration{} as applied without running them.",
        marked.len(),
        if marked.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
