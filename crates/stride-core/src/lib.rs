//! stride-core - Core library for Stride
//!
//! This crate provides the migration model, dependency graph, migration-file
//! loader, and project configuration shared across all Stride components.

pub mod config;
pub mod error;
pub mod graph;
pub mod loader;
pub mod migration;
pub mod migration_id;

pub use config::{Config, CONFIG_FILE};
pub use error::{CoreError, CoreResult};
pub use graph::DependencyGraph;
pub use loader::{
    make_filename, migration_path, parse_sql_migration, render_template, rewrite_depends, Loader,
};
pub use migration::{
    migration_hash, CodeBody, DynError, Migration, MigrationBody, MigrationSet, SqlExecutor,
};
pub use migration_id::MigrationId;
