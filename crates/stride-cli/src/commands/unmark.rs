//! Unmark command implementation

use anyhow::Result;
use stride_engine::Engine;

use crate::cli::{GlobalArgs, UnmarkArgs};
use crate::commands::common::{connect, decider, load_migrations, load_project};

/// Execute the unmark command
pub(crate) async fn execute(_args: &UnmarkArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let (set, _) = load_migrations(&project)?;
    let db = connect(&project)?;

    let mut decider = decider(global);
    let engine = Engine::new(&db, project.config.schema.clone());
    let unmarked = engine.unmark(&set, decider.as_mut()).await?;

    if unmarked.is_empty() {
        println!("Nothing unmarked.");
        return Ok(());
    }
    for id in &unmarked {
        println!("  unmarked {id}");
    }
    println!(
        "Unmarked {} migration{} without rolling them back.",
        unmarked.len(),
        if unmarked.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
