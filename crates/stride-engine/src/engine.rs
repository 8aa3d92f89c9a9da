//! Apply/rollback/mark/unmark state machine
//!
//! Reconciles graph order against the persisted applied history. Execution
//! is strictly sequential: one migration at a time, halting on the first
//! failure. A transactional migration commits its body and its applied
//! record atomically; a non-transactional one runs bare and records
//! immediately after success. Earlier successes in a halted run stay
//! committed.

use crate::decision::{Decide, Decision};
use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use stride_core::{
    DependencyGraph, DynError, Migration, MigrationBody, MigrationId, MigrationSet, SqlExecutor,
};
use stride_db::{Database, StateStore};

/// What to roll back.
#[derive(Debug, Clone)]
pub enum RollbackTarget {
    /// The most recent N applied migrations
    Count(usize),
    /// Everything applied at or after this id, in historical order
    Id(String),
}

/// One line of the history report.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: String,
    pub applied: bool,
    /// "sql" / "code", or "missing" for a recorded id absent from the set
    pub format: &'static str,
    pub applied_at: Option<String>,
    pub message: String,
}

/// Adapter handing code migrations a statement port over the session.
struct ExecutorAdapter<'a> {
    db: &'a dyn Database,
}

#[async_trait]
impl SqlExecutor for ExecutorAdapter<'_> {
    async fn execute(&self, sql: &str) -> Result<(), DynError> {
        self.db
            .execute_batch(sql)
            .await
            .map_err(|e| Box::new(e) as DynError)
    }
}

/// The migration engine over one database session.
pub struct Engine<'a> {
    db: &'a dyn Database,
    store: StateStore<'a>,
}

impl<'a> Engine<'a> {
    pub fn new(db: &'a dyn Database, schema: Option<String>) -> Self {
        let store = StateStore::new(db, schema);
        Self { db, store }
    }

    /// Apply every pending migration in topological order.
    ///
    /// Returns the ids applied by this run. On failure the error names the
    /// failing migration; migrations after it are never attempted and the
    /// returned error leaves earlier successes committed.
    pub async fn apply(
        &self,
        set: &MigrationSet,
        graph: &DependencyGraph,
    ) -> EngineResult<Vec<MigrationId>> {
        self.store.ensure().await?;
        let applied = self.store.applied_ids().await?;

        let mut executed = Vec::new();
        for id in graph.topological_order()? {
            if applied.contains(id.as_str()) {
                continue;
            }
            let migration = require(set, &id)?;
            self.apply_one(migration).await?;
            log::info!("applied {id}");
            executed.push(id);
        }
        Ok(executed)
    }

    async fn apply_one(&self, migration: &Migration) -> EngineResult<()> {
        let id = &migration.id;
        let fail = |statement_index, cause: String| EngineError::ApplyFailed {
            id: id.to_string(),
            statement_index,
            cause,
        };

        if migration.transactional {
            self.db.begin().await?;
            let result = self.run_leg(migration, Leg::Apply).await;
            match result {
                Ok(()) => {
                    if let Err(e) = self.store.record_applied(id, &migration.hash).await {
                        self.db.rollback().await?;
                        return Err(fail(None, e.to_string()));
                    }
                    self.db.commit().await?;
                    Ok(())
                }
                Err((statement_index, cause)) => {
                    self.db.rollback().await?;
                    Err(fail(statement_index, cause))
                }
            }
        } else {
            self.run_leg(migration, Leg::Apply)
                .await
                .map_err(|(statement_index, cause)| fail(statement_index, cause))?;
            self.store.record_applied(id, &migration.hash).await?;
            Ok(())
        }
    }

    /// Roll back applied migrations in reverse historical order.
    ///
    /// Historical order is `applied_at` descending, which differs from graph
    /// order when records were marked out of order. Returns the ids rolled
    /// back by this run.
    pub async fn rollback(
        &self,
        set: &MigrationSet,
        target: RollbackTarget,
    ) -> EngineResult<Vec<MigrationId>> {
        self.store.ensure().await?;
        let history = self.store.applied_in_rollback_order().await?;

        let selected: Vec<String> = match target {
            RollbackTarget::Count(n) => history.into_iter().take(n).collect(),
            RollbackTarget::Id(id) => {
                if !history.iter().any(|h| *h == id) {
                    return Err(EngineError::State {
                        message: format!("migration '{id}' is not applied"),
                    });
                }
                let mut selected = Vec::new();
                for applied_id in history {
                    let done = applied_id == id;
                    selected.push(applied_id);
                    if done {
                        break;
                    }
                }
                selected
            }
        };

        let mut executed = Vec::new();
        for id in selected {
            let migration = set.get(&id).ok_or_else(|| EngineError::State {
                message: format!("applied migration '{id}' is missing from the loaded set"),
            })?;
            self.rollback_one(migration).await?;
            log::info!("rolled back {id}");
            executed.push(migration.id.clone());
        }
        Ok(executed)
    }

    async fn rollback_one(&self, migration: &Migration) -> EngineResult<()> {
        let id = &migration.id;
        let fail = |statement_index, cause: String| EngineError::RollbackFailed {
            id: id.to_string(),
            statement_index,
            cause,
        };

        if migration.transactional {
            self.db.begin().await?;
            let result = self.run_leg(migration, Leg::Rollback).await;
            match result {
                Ok(()) => {
                    if let Err(e) = self.store.remove_applied(id).await {
                        self.db.rollback().await?;
                        return Err(fail(None, e.to_string()));
                    }
                    self.db.commit().await?;
                    Ok(())
                }
                Err((statement_index, cause)) => {
                    self.db.rollback().await?;
                    Err(fail(statement_index, cause))
                }
            }
        } else {
            self.run_leg(migration, Leg::Rollback)
                .await
                .map_err(|(statement_index, cause)| fail(statement_index, cause))?;
            self.store.remove_applied(id).await?;
            Ok(())
        }
    }

    /// Record pending migrations as applied without executing their bodies.
    ///
    /// Walks topological order; each id is confirmed through the decision
    /// port. `No` skips one id, `Stop` ends the walk.
    pub async fn mark(
        &self,
        set: &MigrationSet,
        graph: &DependencyGraph,
        decider: &mut dyn Decide,
    ) -> EngineResult<Vec<MigrationId>> {
        self.store.ensure().await?;
        let applied = self.store.applied_ids().await?;

        let mut marked = Vec::new();
        for id in graph.topological_order()? {
            if applied.contains(id.as_str()) {
                continue;
            }
            let migration = require(set, &id)?;
            match decider.confirm(&format!("mark '{id}' as applied without running it?")) {
                Decision::Yes => {
                    self.store.record_applied(&id, &migration.hash).await?;
                    log::info!("marked {id} as applied");
                    marked.push(id);
                }
                Decision::No => continue,
                Decision::Stop => break,
            }
        }
        Ok(marked)
    }

    /// Delete applied records without executing rollback bodies.
    ///
    /// Walks reverse historical order with the same decision protocol as
    /// [`mark`](Self::mark).
    pub async fn unmark(
        &self,
        set: &MigrationSet,
        decider: &mut dyn Decide,
    ) -> EngineResult<Vec<MigrationId>> {
        self.store.ensure().await?;

        let mut unmarked = Vec::new();
        for id in self.store.applied_in_rollback_order().await? {
            let migration = set.get(&id).ok_or_else(|| EngineError::State {
                message: format!("applied migration '{id}' is missing from the loaded set"),
            })?;
            match decider.confirm(&format!("unmark '{id}' without rolling it back?")) {
                Decision::Yes => {
                    self.store.remove_applied(&id).await?;
                    log::info!("unmarked {id}");
                    unmarked.push(migration.id.clone());
                }
                Decision::No => continue,
                Decision::Stop => break,
            }
        }
        Ok(unmarked)
    }

    /// Structured history: applied rows in apply order, then pending ids in
    /// topological order, then recorded ids missing from the loaded set.
    pub async fn history(
        &self,
        set: &MigrationSet,
        graph: &DependencyGraph,
    ) -> EngineResult<Vec<HistoryEntry>> {
        self.store.ensure().await?;
        let history = self.store.history().await?;

        let mut entries = Vec::new();
        for row in &history {
            match set.get(&row.id) {
                Some(migration) => entries.push(HistoryEntry {
                    id: row.id.clone(),
                    applied: true,
                    format: migration.body.format_name(),
                    applied_at: Some(row.applied_at.clone()),
                    message: migration.message.clone(),
                }),
                None => entries.push(HistoryEntry {
                    id: row.id.clone(),
                    applied: true,
                    format: "missing",
                    applied_at: Some(row.applied_at.clone()),
                    message: String::new(),
                }),
            }
        }

        for id in graph.topological_order()? {
            if history.iter().any(|row| row.id == id.as_str()) {
                continue;
            }
            let migration = require(set, &id)?;
            entries.push(HistoryEntry {
                id: id.to_string(),
                applied: false,
                format: migration.body.format_name(),
                applied_at: None,
                message: migration.message.clone(),
            });
        }
        Ok(entries)
    }

    /// Run one leg of a migration body, reporting the failing statement.
    async fn run_leg(
        &self,
        migration: &Migration,
        leg: Leg,
    ) -> Result<(), (Option<usize>, String)> {
        match &migration.body {
            MigrationBody::Sql { apply, rollback } => {
                let statements = match leg {
                    Leg::Apply => apply,
                    Leg::Rollback => rollback,
                };
                for (index, statement) in statements.iter().enumerate() {
                    if let Err(e) = self.db.execute_batch(statement).await {
                        return Err((Some(index), e.to_string()));
                    }
                }
                Ok(())
            }
            MigrationBody::Code(body) => {
                let executor = ExecutorAdapter { db: self.db };
                let result = match leg {
                    Leg::Apply => body.apply(&executor).await,
                    Leg::Rollback => body.rollback(&executor).await,
                };
                result.map_err(|e| (None, e.to_string()))
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Leg {
    Apply,
    Rollback,
}

fn require<'s>(set: &'s MigrationSet, id: &MigrationId) -> EngineResult<&'s Migration> {
    set.get(id).ok_or_else(|| EngineError::State {
        message: format!("graph id '{id}' is missing from the loaded set"),
    })
}
