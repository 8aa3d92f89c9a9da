//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// Database abstraction trait for Stride
///
/// One implementation holds one session; the engine runs strictly
/// sequentially over it, so transaction control is session-scoped
/// (`begin`/`commit`/`rollback` affect the single active transaction).
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute SQL that modifies data, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute a query, returning all rows with values rendered as strings
    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Vec<String>>>;

    /// Execute a query, returning the first column of every row
    async fn query_column(&self, sql: &str) -> DbResult<Vec<String>> {
        let rows = self.query_rows(sql).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .collect())
    }

    /// Open a transaction on the active session
    async fn begin(&self) -> DbResult<()>;

    /// Commit the active transaction
    async fn commit(&self) -> DbResult<()>;

    /// Roll back the active transaction
    async fn rollback(&self) -> DbResult<()>;

    /// Create a schema if it does not exist
    async fn ensure_schema(&self, schema: &str) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
