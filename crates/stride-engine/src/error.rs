//! Error types for stride-engine

use stride_core::CoreError;
use stride_db::DbError;
use thiserror::Error;

/// Engine operation errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// G001: A migration's apply leg failed; the run halts here
    #[error("[G001] Apply of '{id}' failed: {cause}")]
    ApplyFailed {
        id: String,
        /// Index of the failing statement for SQL bodies
        statement_index: Option<usize>,
        cause: String,
    },

    /// G002: A migration's rollback leg failed; the run halts here
    #[error("[G002] Rollback of '{id}' failed: {cause}")]
    RollbackFailed {
        id: String,
        statement_index: Option<usize>,
        cause: String,
    },

    /// G003: Recorded state disagrees with the loaded migration set
    #[error("[G003] State error: {message}")]
    State { message: String },

    /// G004: A DDL statement could not be attributed to a table during squash
    #[error("[G004] Cannot squash '{id}': statement {statement_index} has no attributable table")]
    SquashUnattributable { id: String, statement_index: usize },

    /// Database-level error outside a migration body
    #[error(transparent)]
    Db(#[from] DbError),

    /// Load/graph error surfaced during an engine operation
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;
