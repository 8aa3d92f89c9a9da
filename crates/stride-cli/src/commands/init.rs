//! Init command implementation - scaffolds a new stride project

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use stride_core::CONFIG_FILE;

use crate::cli::InitArgs;

/// Execute the init command
pub(crate) async fn execute(args: &InitArgs) -> Result<()> {
    let project_dir = Path::new(&args.directory);
    let config_path = project_dir.join(CONFIG_FILE);

    if config_path.exists() {
        anyhow::bail!(
            "'{}' already exists. Refusing to overwrite it.",
            config_path.display()
        );
    }

    let migrations_dir = project_dir.join("migrations");
    fs::create_dir_all(&migrations_dir)
        .with_context(|| format!("Failed to create directory: {}", migrations_dir.display()))?;

    // Escape YAML special characters in interpolated values
    let safe_db_path = args.database.replace('"', "\\\"");
    let config_content = format!(
        r#"migrations: migrations
database: "{db_path}"
dialect: duckdb

# schema: meta          # where the state tables live (database default when unset)
# squash_exclude:       # migration ids never consumed by squash
#   - 20240101_01-init
"#,
        db_path = safe_db_path,
    );
    fs::write(&config_path, config_content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let gitignore = "*.duckdb\n*.duckdb.wal\n*.bak\n";
    fs::write(project_dir.join(".gitignore"), gitignore).context("Failed to write .gitignore")?;

    println!("  Created {}", config_path.display());
    println!("  Created {}/", migrations_dir.display());
    println!("  Created {}", project_dir.join(".gitignore").display());
    println!();
    println!("Project initialized. Next steps:");
    println!("  stride new \"initial schema\"   # create the first migration");
    println!("  stride apply                  # run pending migrations");

    Ok(())
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
