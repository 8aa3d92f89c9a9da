//! Applied-migration state store
//!
//! Two bookkeeping tables track what has been applied: `_stride_migration`
//! holds one row per applied migration (hash, id, timestamp) and
//! `_stride_version` carries the state-schema version. Both are created on
//! demand and live in the configured schema when one is set.

use crate::error::DbResult;
use crate::traits::Database;
use std::collections::BTreeSet;

const MIGRATION_TABLE: &str = "_stride_migration";
const VERSION_TABLE: &str = "_stride_version";
const STATE_VERSION: u32 = 1;

/// One row of applied history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub id: String,
    pub hash: String,
    pub applied_at: String,
}

/// Store of applied migrations over an active database session.
pub struct StateStore<'a> {
    db: &'a dyn Database,
    schema: Option<String>,
}

impl<'a> StateStore<'a> {
    pub fn new(db: &'a dyn Database, schema: Option<String>) -> Self {
        Self { db, schema }
    }

    fn table(&self, name: &str) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{name}"),
            None => name.to_string(),
        }
    }

    /// Create the state tables if they do not exist.
    pub async fn ensure(&self) -> DbResult<()> {
        if let Some(schema) = &self.schema {
            self.db.ensure_schema(schema).await?;
        }
        let migration_table = self.table(MIGRATION_TABLE);
        let version_table = self.table(VERSION_TABLE);
        self.db
            .execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {migration_table} (\n\
                 \x20   migration_hash VARCHAR(64) PRIMARY KEY,\n\
                 \x20   migration_id VARCHAR(255) NOT NULL,\n\
                 \x20   applied TIMESTAMP NOT NULL\n\
                 );\n\
                 CREATE TABLE IF NOT EXISTS {version_table} (version INTEGER NOT NULL);\n\
                 INSERT INTO {version_table}\n\
                 SELECT {STATE_VERSION} WHERE NOT EXISTS (SELECT * FROM {version_table});"
            ))
            .await?;
        log::debug!("state tables ready in {}", self.db.db_type());
        Ok(())
    }

    /// Ids of all applied migrations.
    pub async fn applied_ids(&self) -> DbResult<BTreeSet<String>> {
        let sql = format!(
            "SELECT migration_id FROM {} ORDER BY migration_id",
            self.table(MIGRATION_TABLE)
        );
        Ok(self.db.query_column(&sql).await?.into_iter().collect())
    }

    /// True when the id has an applied record.
    pub async fn is_applied(&self, id: &str) -> DbResult<bool> {
        let sql = format!(
            "SELECT migration_id FROM {} WHERE migration_id = '{}'",
            self.table(MIGRATION_TABLE),
            quote_literal(id)
        );
        Ok(!self.db.query_column(&sql).await?.is_empty())
    }

    /// Applied ids, most recently applied first.
    ///
    /// This is historical apply order, not graph order; the two differ when
    /// records were marked out of order. Id breaks timestamp ties so the
    /// order stays deterministic within one timestamp granule.
    pub async fn applied_in_rollback_order(&self) -> DbResult<Vec<String>> {
        let sql = format!(
            "SELECT migration_id FROM {} ORDER BY applied DESC, migration_id DESC",
            self.table(MIGRATION_TABLE)
        );
        self.db.query_column(&sql).await
    }

    /// Insert the applied record for a migration.
    pub async fn record_applied(&self, id: &str, hash: &str) -> DbResult<()> {
        let sql = format!(
            "INSERT INTO {} (migration_hash, migration_id, applied) VALUES ('{}', '{}', CURRENT_TIMESTAMP)",
            self.table(MIGRATION_TABLE),
            quote_literal(hash),
            quote_literal(id)
        );
        self.db.execute(&sql).await?;
        Ok(())
    }

    /// Delete the applied record for a migration.
    pub async fn remove_applied(&self, id: &str) -> DbResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE migration_id = '{}'",
            self.table(MIGRATION_TABLE),
            quote_literal(id)
        );
        self.db.execute(&sql).await?;
        Ok(())
    }

    /// Full applied history in apply order.
    pub async fn history(&self) -> DbResult<Vec<AppliedMigration>> {
        let sql = format!(
            "SELECT migration_id, migration_hash, CAST(applied AS VARCHAR) FROM {} ORDER BY applied, migration_id",
            self.table(MIGRATION_TABLE)
        );
        let rows = self.db.query_rows(&sql).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let mut values = row.into_iter();
                Some(AppliedMigration {
                    id: values.next()?,
                    hash: values.next()?,
                    applied_at: values.next()?,
                })
            })
            .collect())
    }
}

/// Escape a string for inclusion in a single-quoted SQL literal.
fn quote_literal(s: &str) -> String {
    s.replace('\'', "''")
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
