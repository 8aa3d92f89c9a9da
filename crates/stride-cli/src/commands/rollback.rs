//! Rollback command implementation

use anyhow::Result;
use stride_engine::{Engine, RollbackTarget};

use crate::cli::{GlobalArgs, RollbackArgs};
use crate::commands::common::{connect, load_migrations, load_project};

/// Execute the rollback command
pub(crate) async fn execute(args: &RollbackArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let (set, _) = load_migrations(&project)?;
    let db = connect(&project)?;

    let target = match &args.id {
        Some(id) => RollbackTarget::Id(id.clone()),
        None => RollbackTarget::Count(args.count),
    };

    let engine = Engine::new(&db, project.config.schema.clone());
    let rolled_back = engine.rollback(&set, target).await?;

    if rolled_back.is_empty() {
        println!("Nothing to roll back.");
        return Ok(());
    }
    for id in &rolled_back {
        println!("  rolled back {id}");
    }
    println!(
        "Rolled back {} migration{}.",
        rolled_back.len(),
        if rolled_back.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
