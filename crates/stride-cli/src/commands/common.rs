//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use stride_core::{Config, DependencyGraph, Loader, MigrationSet};
use stride_db::DuckDbBackend;
use stride_engine::{AcceptAll, Decide};

use crate::cli::GlobalArgs;
use crate::prompt::TerminalPrompt;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism, not a
        // user-facing error. If anyhow's Display chain ever reaches this
        // (e.g. downcast_ref fails in main.rs), we don't want "exit code N"
        // leaking into stderr.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// A loaded project: the configuration plus its resolved migrations
/// directory.
pub(crate) struct Project {
    pub config: Config,
    pub migrations_dir: PathBuf,
}

/// Load the configuration named by the global `--config` flag.
///
/// Relative paths inside the config resolve against the config file's own
/// directory, so `stride -c deploy/stride.yml apply` works from anywhere.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let path = Path::new(&global.config);
    let config = Config::load(path).context("Failed to load configuration")?;

    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let migrations_dir = config.migrations_dir(&root);
    Ok(Project {
        config,
        migrations_dir,
    })
}

/// Load the migration set and its dependency graph from a project.
pub(crate) fn load_migrations(project: &Project) -> Result<(MigrationSet, DependencyGraph)> {
    let set = Loader::new().load(&project.migrations_dir)?;
    let graph = DependencyGraph::build(&set)?;
    Ok((set, graph))
}

/// Open the database configured for the project.
pub(crate) fn connect(project: &Project) -> Result<DuckDbBackend> {
    let path = project.config.database_path()?;
    DuckDbBackend::new(path).with_context(|| format!("Failed to open database '{path}'"))
}

/// The confirmation source: a terminal prompt, or accept-all under `--yes`.
pub(crate) fn decider(global: &GlobalArgs) -> Box<dyn Decide> {
    if global.yes {
        Box::new(AcceptAll)
    } else {
        Box::new(TerminalPrompt::new())
    }
}

/// Copy `path` to `path.bak` before it gets rewritten or deleted.
pub(crate) fn backup_file(path: &Path) -> Result<PathBuf> {
    let mut backup = path.as_os_str().to_os_string();
    backup.push(".bak");
    let backup = PathBuf::from(backup);
    std::fs::copy(path, &backup)
        .with_context(|| format!("Failed to back up {}", path.display()))?;
    Ok(backup)
}
