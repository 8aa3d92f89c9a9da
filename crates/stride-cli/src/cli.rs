//! CLI argument definitions using clap derive API

use clap::{ArgAction, Args, Parser, Subcommand};

/// Stride - dependency-graph database migrations
#[derive(Parser, Debug)]
#[command(name = "stride")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Path to the project configuration file
    #[arg(short, long, global = true, env = "STRIDE_CONFIG", default_value = "stride.yml")]
    pub config: String,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a new stride project in a directory
    Init(InitArgs),

    /// Create a new migration file depending on the current head
    New(NewArgs),

    /// Apply all pending migrations in dependency order
    Apply(ApplyArgs),

    /// Roll back applied migrations in reverse historical order
    Rollback(RollbackArgs),

    /// Show applied and pending migrations
    History(HistoryArgs),

    /// Record pending migrations as applied without running them
    Mark(MarkArgs),

    /// Delete applied records without running rollback bodies
    Unmark(UnmarkArgs),

    /// Splice a migration out of the dependency chain
    Remove(RemoveArgs),

    /// Merge a run of migrations into one, grouped by table
    Squash(SquashArgs),

    /// Lint migration statements without executing them
    Validate(ValidateArgs),

    /// Delete .bak files left behind by remove/squash
    Clean(CleanArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to scaffold the project in
    #[arg(default_value = ".")]
    pub directory: String,

    /// Database file path written into the generated config
    #[arg(short, long, default_value = "stride.duckdb")]
    pub database: String,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// One-line migration message (becomes the file slug)
    pub message: String,
}

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {}

/// Arguments for the rollback command
#[derive(Args, Debug)]
pub struct RollbackArgs {
    /// Number of most recently applied migrations to roll back
    #[arg(short = 'n', long, default_value_t = 1, conflicts_with = "id")]
    pub count: usize,

    /// Roll back everything applied at or after this id (inclusive)
    #[arg(short, long)]
    pub id: Option<String>,
}

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {}

/// Arguments for the mark command
#[derive(Args, Debug)]
pub struct MarkArgs {}

/// Arguments for the unmark command
#[derive(Args, Debug)]
pub struct UnmarkArgs {}

/// Arguments for the remove command
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Id of the migration to remove
    pub id: String,

    /// Keep .bak copies of every file this command touches
    #[arg(short, long)]
    pub backup: bool,
}

/// Arguments for the squash command
#[derive(Args, Debug)]
pub struct SquashArgs {
    /// Keep .bak copies of the consumed migration files
    #[arg(short, long)]
    pub backup: bool,

    /// Annotate each squashed statement with its source migration
    #[arg(short, long)]
    pub source: bool,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

/// Arguments for the clean command
#[derive(Args, Debug)]
pub struct CleanArgs {}
