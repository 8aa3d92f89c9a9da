//! Error types for stride-core

use thiserror::Error;

/// Core error type for Stride
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Migrations directory not found
    #[error("[E004] Migrations directory not found: {path}")]
    MigrationsDirNotFound { path: String },

    /// E005: Migration not found in the loaded set
    #[error("[E005] Migration not found: {id}")]
    MigrationNotFound { id: String },

    /// E006: Malformed migration file
    #[error("[E006] Bad migration '{id}': {message}")]
    BadMigration { id: String, message: String },

    /// E007: Circular dependency detected
    #[error("[E007] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E008: Duplicate migration id
    #[error("[E008] Duplicate migration id: {id}")]
    DuplicateMigration { id: String },

    /// E009: Dependency on a migration that is not in the loaded set
    #[error("[E009] Migration '{id}' depends on unknown migration '{depends_on}'")]
    DanglingDependency { id: String, depends_on: String },

    /// E010: More than one head, caller must pick explicitly
    #[error("[E010] Multiple head migrations, specify a dependency explicitly: {heads}")]
    AmbiguousHeads { heads: String },

    /// E011: Empty migration id
    #[error("[E011] Migration id must not be empty")]
    EmptyId,

    /// E012: IO error
    #[error("[E012] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E013: IO error with file path context
    #[error("[E013] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E014: YAML parse error
    #[error("[E014] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
