//! stride-db - Database abstraction layer for Stride
//!
//! This crate provides the async `Database` trait, the bundled DuckDB
//! backend, and the `StateStore` over the applied-migrations tables.

pub mod duckdb;
pub mod error;
pub mod state;
pub mod traits;

pub use crate::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use state::{AppliedMigration, StateStore};
pub use traits::Database;
