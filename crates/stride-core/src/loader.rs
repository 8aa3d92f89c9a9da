//! Migration file loading
//!
//! A SQL migration file is a commented header followed by two statement
//! sections:
//!
//! ```sql
//! -- create the users table
//! -- depends: 20240101_01-init
//! -- stride: no-transaction        (optional)
//! -- migrate: apply
//! CREATE TABLE users (id INT);
//! -- migrate: rollback
//! DROP TABLE users;
//! ```
//!
//! The id is the file stem. Code migrations are registered on the loader and
//! merged into the same set.

use crate::error::{CoreError, CoreResult};
use crate::migration::{Migration, MigrationSet};
use crate::migration_id::MigrationId;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use stride_sql::split_statements;

const APPLY_MARKER: &str = "-- migrate: apply";
const ROLLBACK_MARKER: &str = "-- migrate: rollback";
const DEPENDS_PREFIX: &str = "-- depends:";
const NO_TRANSACTION_MARKER: &str = "-- stride: no-transaction";

/// Loads migration files from a directory, merging registered code
/// migrations into the set.
#[derive(Default)]
pub struct Loader {
    registered: Vec<Migration>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a code-format migration to be merged on load.
    pub fn register(&mut self, migration: Migration) -> &mut Self {
        self.registered.push(migration);
        self
    }

    /// Load all `*.sql` files from `dir` plus the registered migrations.
    ///
    /// Fails on duplicate ids and dangling dependencies; callers build the
    /// graph afterwards for cycle checking.
    pub fn load(&self, dir: &Path) -> CoreResult<MigrationSet> {
        if !dir.is_dir() {
            return Err(CoreError::MigrationsDirNotFound {
                path: dir.display().to_string(),
            });
        }

        let mut set = MigrationSet::new();

        for path in sql_files(dir)? {
            let id = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => MigrationId::try_new(stem).ok_or(CoreError::EmptyId)?,
                None => continue,
            };
            let content =
                std::fs::read_to_string(&path).map_err(|source| CoreError::IoWithPath {
                    path: path.display().to_string(),
                    source,
                })?;
            let migration = parse_sql_migration(id, &content)?;
            log::debug!("loaded migration {}", migration.id);
            set.insert(migration)?;
        }

        for migration in &self.registered {
            set.insert(migration.clone())?;
        }

        set.validate()?;
        log::info!("loaded {} migrations from {}", set.len(), dir.display());
        Ok(set)
    }
}

/// Enumerate `*.sql` files in `dir`, sorted by file name.
fn sql_files(dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|source| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().map(|ext| ext == "sql").unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// The on-disk path of a migration id inside a migrations directory.
pub fn migration_path(dir: &Path, id: &MigrationId) -> PathBuf {
    dir.join(format!("{id}.sql"))
}

/// Parse a SQL migration file body into a [`Migration`].
pub fn parse_sql_migration(id: MigrationId, content: &str) -> CoreResult<Migration> {
    let bad = |message: &str| CoreError::BadMigration {
        id: id.to_string(),
        message: message.to_string(),
    };

    enum Section {
        Header,
        Apply,
        Rollback,
    }

    let mut message: Option<String> = None;
    let mut depends: BTreeSet<MigrationId> = BTreeSet::new();
    let mut transactional = true;
    let mut apply_buf = String::new();
    let mut rollback_buf = String::new();
    let mut seen_apply = false;
    let mut seen_rollback = false;
    let mut section = Section::Header;

    for line in content.lines() {
        let trimmed = line.trim();

        if let Some(marker) = trimmed.strip_prefix("-- migrate:") {
            match marker.trim() {
                "apply" => {
                    if seen_apply {
                        return Err(bad("duplicate '-- migrate: apply' section"));
                    }
                    seen_apply = true;
                    section = Section::Apply;
                }
                "rollback" => {
                    if seen_rollback {
                        return Err(bad("duplicate '-- migrate: rollback' section"));
                    }
                    seen_rollback = true;
                    section = Section::Rollback;
                }
                other => {
                    return Err(bad(&format!(
                        "unknown section '-- migrate: {other}' (expected apply or rollback)"
                    )))
                }
            }
            continue;
        }

        match section {
            Section::Apply => {
                apply_buf.push_str(line);
                apply_buf.push('\n');
            }
            Section::Rollback => {
                rollback_buf.push_str(line);
                rollback_buf.push('\n');
            }
            Section::Header => {
                if let Some(ids) = trimmed.strip_prefix(DEPENDS_PREFIX) {
                    for token in ids.split([',', ' ']).filter(|t| !t.is_empty()) {
                        depends.insert(
                            MigrationId::try_new(token)
                                .ok_or_else(|| bad("empty id in depends line"))?,
                        );
                    }
                } else if trimmed == NO_TRANSACTION_MARKER {
                    transactional = false;
                } else if let Some(comment) = trimmed.strip_prefix("--") {
                    if message.is_none() && !comment.trim().is_empty() {
                        message = Some(comment.trim().to_string());
                    }
                } else if !trimmed.is_empty() {
                    return Err(bad(&format!(
                        "unexpected content before '{APPLY_MARKER}': {trimmed}"
                    )));
                }
            }
        }
    }

    let message = message.ok_or_else(|| bad("missing leading message comment"))?;
    if !seen_apply {
        return Err(bad("missing '-- migrate: apply' section"));
    }
    if !seen_rollback {
        return Err(bad("missing '-- migrate: rollback' section"));
    }
    let apply = apply_buf;
    let rollback = rollback_buf;

    Ok(Migration::sql(
        id,
        message,
        depends,
        transactional,
        split_statements(&apply),
        split_statements(&rollback),
    ))
}

/// Render the file content for a fresh migration.
pub fn render_template(message: &str, depends: &[MigrationId]) -> String {
    let mut out = format!("-- {message}\n");
    if !depends.is_empty() {
        let ids: Vec<&str> = depends.iter().map(|d| d.as_str()).collect();
        out.push_str(&format!("{DEPENDS_PREFIX} {}\n", ids.join(" ")));
    }
    out.push_str(&format!("\n{APPLY_MARKER}\n\n\n{ROLLBACK_MARKER}\n\n"));
    out
}

/// File name for a new migration: `{YYYYMMDD}_{NN}-{slug}.sql`.
pub fn make_filename(message: &str, sequence: u32, date: NaiveDate) -> String {
    format!(
        "{}_{:02}-{}.sql",
        date.format("%Y%m%d"),
        sequence,
        slugify(message)
    )
}

/// Rewrite the depends header of an existing migration file.
///
/// Existing `-- depends:` lines in the header are dropped and one fresh line
/// is inserted after the message comment (none when `depends` is empty).
/// Section bodies pass through untouched.
pub fn rewrite_depends(content: &str, depends: &BTreeSet<MigrationId>) -> String {
    let mut out = String::new();
    let mut in_header = true;
    let mut inserted = depends.is_empty();

    for line in content.lines() {
        let trimmed = line.trim();
        if in_header {
            if trimmed.strip_prefix("-- migrate:").is_some() {
                in_header = false;
            } else if trimmed.strip_prefix(DEPENDS_PREFIX).is_some() {
                continue;
            } else if !inserted && trimmed.starts_with("--") {
                // message line: depends goes right after it
                out.push_str(line);
                out.push('\n');
                let ids: Vec<&str> = depends.iter().map(|d| d.as_str()).collect();
                out.push_str(&format!("{DEPENDS_PREFIX} {}\n", ids.join(" ")));
                inserted = true;
                continue;
            }
        }
        out.push_str(line);
        out.push('\n');
    }

    out
}

/// Reduce a message to a file-name-safe slug.
fn slugify(message: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = true;
    for c in message.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
        if slug.len() >= 40 {
            break;
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
