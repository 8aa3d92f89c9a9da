//! Migration model
//!
//! A migration is an id, a human message, a dependency set, a transactional
//! flag, and a body. Bodies come in two formats behind one capability
//! surface: SQL files carry ordered raw statement texts for each leg, code
//! migrations carry a trait object that drives an executor directly.

use crate::error::{CoreError, CoreResult};
use crate::migration_id::MigrationId;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Boxed error for code-migration bodies, mapped by the engine.
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Statement execution port handed to code migrations.
///
/// Code bodies never see the concrete database; they get this narrow surface
/// so they stay format-symmetric with SQL bodies.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Execute one statement on the active connection.
    async fn execute(&self, sql: &str) -> Result<(), DynError>;
}

/// A migration implemented in code rather than a SQL file.
#[async_trait]
pub trait CodeBody: Send + Sync {
    /// Run the apply leg.
    async fn apply(&self, executor: &dyn SqlExecutor) -> Result<(), DynError>;

    /// Run the rollback leg.
    async fn rollback(&self, executor: &dyn SqlExecutor) -> Result<(), DynError>;
}

/// Migration body, tagged by format.
#[derive(Clone)]
pub enum MigrationBody {
    /// SQL file body: ordered raw statement texts per leg
    Sql {
        apply: Vec<String>,
        rollback: Vec<String>,
    },
    /// Code body: caller-registered trait object
    Code(Arc<dyn CodeBody>),
}

impl MigrationBody {
    /// True for the SQL file format.
    pub fn is_sql(&self) -> bool {
        matches!(self, MigrationBody::Sql { .. })
    }

    /// Short format name for reports ("sql" / "code").
    pub fn format_name(&self) -> &'static str {
        match self {
            MigrationBody::Sql { .. } => "sql",
            MigrationBody::Code(_) => "code",
        }
    }
}

impl std::fmt::Debug for MigrationBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationBody::Sql { apply, rollback } => f
                .debug_struct("Sql")
                .field("apply", &apply.len())
                .field("rollback", &rollback.len())
                .finish(),
            MigrationBody::Code(_) => f.write_str("Code(..)"),
        }
    }
}

/// One migration unit.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Unique identifier, derived from the file stem
    pub id: MigrationId,
    /// Human-readable description
    pub message: String,
    /// Ids this migration depends on
    pub depends: BTreeSet<MigrationId>,
    /// False for operations incompatible with a wrapping transaction
    pub transactional: bool,
    /// sha256 of the id, persisted alongside the applied record
    pub hash: String,
    /// Body, tagged by format
    pub body: MigrationBody,
}

impl Migration {
    /// Build a SQL-format migration.
    pub fn sql(
        id: MigrationId,
        message: impl Into<String>,
        depends: BTreeSet<MigrationId>,
        transactional: bool,
        apply: Vec<String>,
        rollback: Vec<String>,
    ) -> Self {
        let hash = migration_hash(&id);
        Self {
            id,
            message: message.into(),
            depends,
            transactional,
            hash,
            body: MigrationBody::Sql { apply, rollback },
        }
    }

    /// Build a code-format migration.
    pub fn code(
        id: MigrationId,
        message: impl Into<String>,
        depends: BTreeSet<MigrationId>,
        transactional: bool,
        body: Arc<dyn CodeBody>,
    ) -> Self {
        let hash = migration_hash(&id);
        Self {
            id,
            message: message.into(),
            depends,
            transactional,
            hash,
            body: MigrationBody::Code(body),
        }
    }

    /// Apply-leg statements for a SQL body, `None` for code.
    pub fn apply_statements(&self) -> Option<&[String]> {
        match &self.body {
            MigrationBody::Sql { apply, .. } => Some(apply),
            MigrationBody::Code(_) => None,
        }
    }

    /// Rollback-leg statements for a SQL body, `None` for code.
    pub fn rollback_statements(&self) -> Option<&[String]> {
        match &self.body {
            MigrationBody::Sql { rollback, .. } => Some(rollback),
            MigrationBody::Code(_) => None,
        }
    }
}

/// sha256 hex digest of a migration id.
pub fn migration_hash(id: &MigrationId) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_str().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The loaded set of migrations, keyed and iterated by id.
#[derive(Debug, Clone, Default)]
pub struct MigrationSet {
    migrations: BTreeMap<MigrationId, Migration>,
}

impl MigrationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a migration, rejecting a duplicate id.
    pub fn insert(&mut self, migration: Migration) -> CoreResult<()> {
        if self.migrations.contains_key(&migration.id) {
            return Err(CoreError::DuplicateMigration {
                id: migration.id.to_string(),
            });
        }
        self.migrations.insert(migration.id.clone(), migration);
        Ok(())
    }

    /// Look up a migration by id.
    pub fn get(&self, id: &str) -> Option<&Migration> {
        self.migrations.get(id)
    }

    /// True when the id is in the set.
    pub fn contains(&self, id: &str) -> bool {
        self.migrations.contains_key(id)
    }

    /// Iterate migrations in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.values()
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> Vec<MigrationId> {
        self.migrations.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Remove a migration by id, failing distinctly when it is absent.
    pub fn remove(&mut self, id: &str) -> CoreResult<Migration> {
        self.migrations
            .remove(id)
            .ok_or_else(|| CoreError::MigrationNotFound { id: id.to_string() })
    }

    /// Replace the dependency set of an existing migration.
    pub fn set_depends(&mut self, id: &str, depends: BTreeSet<MigrationId>) -> CoreResult<()> {
        let migration = self
            .migrations
            .get_mut(id)
            .ok_or_else(|| CoreError::MigrationNotFound { id: id.to_string() })?;
        migration.depends = depends;
        Ok(())
    }

    /// Check that every dependency resolves within the set.
    pub fn validate(&self) -> CoreResult<()> {
        for migration in self.migrations.values() {
            for dep in &migration.depends {
                if !self.migrations.contains_key(dep) {
                    return Err(CoreError::DanglingDependency {
                        id: migration.id.to_string(),
                        depends_on: dep.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
