//! stride-sql - SQL parsing layer for Stride
//!
//! This crate provides SQL parsing using sqlparser-rs with dialect support,
//! raw statement splitting, per-statement table/kind extraction, and a
//! non-executing lint pass over migration statements.

pub mod error;
pub mod parser;
pub mod splitter;
pub mod statement;
pub mod validator;

pub use error::SqlError;
pub use parser::{SqlFlavor, SqlParser};
pub use splitter::split_statements;
pub use statement::{
    analyze_statement, nullability_change, NullabilityChange, ParsedStatement, StatementKind,
};
pub use validator::{lint_statements, Finding};
