//! Squash compaction
//!
//! Merges a run of SQL migrations into one equivalent migration whose apply
//! statements are grouped by referenced table. Group order is first-discovery
//! order over the apply walk; the rollback leg renders groups in the reverse
//! of that same order (last table created is the first unwound) and reverses
//! the per-group contribution order, so the squashed migration unwinds the
//! same way the originals would have.

use crate::decision::{Decide, Decision};
use crate::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use stride_core::{make_filename, DependencyGraph, Migration, MigrationId, MigrationSet};
use stride_sql::{analyze_statement, nullability_change, NullabilityChange, SqlParser, StatementKind};

/// Group key for statements with no extractable table.
const DATA_GROUP: &str = "__data";

/// Why a migration was left out of the squash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Code-format bodies have no statements to regroup
    CodeFormat,
    /// Non-transactional migrations must keep their own execution envelope
    NonTransactional,
    /// Listed in the configured exclusion set
    Excluded,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            SkipReason::CodeFormat => "code format",
            SkipReason::NonTransactional => "non-transactional",
            SkipReason::Excluded => "excluded by configuration",
        };
        f.write_str(reason)
    }
}

/// Result of a squash: the synthesized migration plus bookkeeping for the
/// caller to persist (write the file, remove/back up consumed ones, rewire
/// skipped dependents).
#[derive(Debug)]
pub struct SquashOutcome {
    /// Id of the synthesized migration (also its file stem)
    pub id: MigrationId,
    /// Rendered migration file content
    pub content: String,
    /// Dependencies of the synthesized migration
    pub depends: BTreeSet<MigrationId>,
    /// Ids consumed by the squash, in walk order
    pub consumed: Vec<MigrationId>,
    /// Ids left in place, each with its reason
    pub skipped: Vec<(MigrationId, SkipReason)>,
}

/// One statement carried through the squash with its provenance.
#[derive(Debug, Clone)]
struct Sourced {
    text: String,
    kind: StatementKind,
    /// Position of the source migration in the consumed walk
    source: usize,
}

pub struct Squasher {
    parser: SqlParser,
    exclude: BTreeSet<String>,
    annotate_source: bool,
}

impl Squasher {
    pub fn new(parser: SqlParser) -> Self {
        Self {
            parser,
            exclude: BTreeSet::new(),
            annotate_source: false,
        }
    }

    /// Ids never consumed by the squash.
    pub fn exclude(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.exclude.extend(ids);
        self
    }

    /// Annotate each statement with a `-- source:` provenance comment.
    pub fn annotate_source(mut self, annotate: bool) -> Self {
        self.annotate_source = annotate;
        self
    }

    /// Squash the eligible run of migrations.
    ///
    /// Returns `None` when fewer than two migrations are eligible. The
    /// decision port is consulted for each update-elision candidate; `Yes`
    /// drops the statement, `No` keeps it, `Stop` keeps everything else
    /// without further prompts.
    pub fn squash(
        &self,
        set: &MigrationSet,
        graph: &DependencyGraph,
        date: NaiveDate,
        decider: &mut dyn Decide,
    ) -> EngineResult<Option<SquashOutcome>> {
        let mut consumed = Vec::new();
        let mut skipped = Vec::new();

        for id in graph.topological_order()? {
            let migration = set.get(&id).ok_or_else(|| EngineError::State {
                message: format!("graph id '{id}' is missing from the loaded set"),
            })?;
            let reason = if !migration.body.is_sql() {
                Some(SkipReason::CodeFormat)
            } else if !migration.transactional {
                Some(SkipReason::NonTransactional)
            } else if self.exclude.contains(id.as_str()) {
                Some(SkipReason::Excluded)
            } else {
                None
            };
            match reason {
                Some(reason) => {
                    log::warn!("skipping {id} from squash: {reason}");
                    skipped.push((id, reason));
                }
                None => consumed.push(migration),
            }
        }

        if consumed.len() < 2 {
            return Ok(None);
        }

        let (order, mut apply_groups) = self.group_statements(&consumed, true)?;
        let (rollback_order, rollback_groups) = self.group_statements(&consumed, false)?;
        self.elide_backfills(&order, &mut apply_groups, decider);

        // Rollback renders under the apply-walk discovery order, reversed,
        // so a table created later is unwound earlier regardless of how its
        // rollback legs were written. Tables seen only on rollback legs slot
        // in after the shared ones; the data group stays last so it leads
        // once reversed.
        let mut unwind_order: Vec<String> = order
            .iter()
            .filter(|key| *key != DATA_GROUP)
            .cloned()
            .collect();
        for key in rollback_order.iter().filter(|key| *key != DATA_GROUP) {
            if !unwind_order.contains(key) {
                unwind_order.push(key.clone());
            }
        }
        if rollback_groups.contains_key(DATA_GROUP) {
            unwind_order.push(DATA_GROUP.to_string());
        }

        // Dependencies of the squash: everything the consumed run depended
        // on outside itself.
        let consumed_ids: BTreeSet<&str> = consumed.iter().map(|m| m.id.as_str()).collect();
        let depends: BTreeSet<MigrationId> = consumed
            .iter()
            .flat_map(|m| m.depends.iter())
            .filter(|dep| !consumed_ids.contains(dep.as_str()))
            .cloned()
            .collect();

        // The synthesized id takes the first day sequence not already held
        // by a loaded migration, so repeated same-day squashes never reuse
        // an id the removal pass would then delete.
        let message = format!("squash of {} migrations", consumed.len());
        let mut sequence = 1;
        let id = loop {
            let filename = make_filename(&message, sequence, date);
            let stem = filename.trim_end_matches(".sql");
            if !set.contains(stem) {
                break MigrationId::try_new(stem).ok_or_else(|| EngineError::State {
                    message: "empty squash id".to_string(),
                })?;
            }
            sequence += 1;
        };

        let content = self.render(
            &message,
            &depends,
            &consumed,
            &order,
            &apply_groups,
            &unwind_order,
            &rollback_groups,
        );

        Ok(Some(SquashOutcome {
            id,
            content,
            depends,
            consumed: consumed.iter().map(|m| m.id.clone()).collect(),
            skipped,
        }))
    }

    /// Group one leg's statements by referenced table.
    ///
    /// Returns the table keys in first-discovery order (data group last) and
    /// the statements per key in walk order. DDL with no extractable table
    /// is a hard error naming the migration; other unattributable statements
    /// fall into the trailing data group.
    fn group_statements(
        &self,
        consumed: &[&Migration],
        apply_leg: bool,
    ) -> EngineResult<(Vec<String>, BTreeMap<String, Vec<Sourced>>)> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: BTreeMap<String, Vec<Sourced>> = BTreeMap::new();
        let mut saw_data = false;

        for (source, migration) in consumed.iter().enumerate() {
            let statements = if apply_leg {
                migration.apply_statements()
            } else {
                migration.rollback_statements()
            }
            .unwrap_or(&[]);

            for (statement_index, text) in statements.iter().enumerate() {
                let parsed = analyze_statement(&self.parser, text);
                let key = match (parsed.table, parsed.kind) {
                    (Some(table), _) => table,
                    (None, StatementKind::Ddl) => {
                        return Err(EngineError::SquashUnattributable {
                            id: migration.id.to_string(),
                            statement_index,
                        })
                    }
                    (None, _) => DATA_GROUP.to_string(),
                };
                if key == DATA_GROUP {
                    saw_data = true;
                } else if !groups.contains_key(&key) {
                    order.push(key.clone());
                }
                groups.entry(key).or_default().push(Sourced {
                    text: text.clone(),
                    kind: parsed.kind,
                    source,
                });
            }
        }

        if saw_data {
            order.push(DATA_GROUP.to_string());
        }
        Ok((order, groups))
    }

    /// Offer DML statements sandwiched between a nullable introduction and a
    /// later SET NOT NULL on the same table for elision.
    fn elide_backfills(
        &self,
        order: &[String],
        groups: &mut BTreeMap<String, Vec<Sourced>>,
        decider: &mut dyn Decide,
    ) {
        let mut stopped = false;
        for table in order {
            if table == DATA_GROUP || stopped {
                continue;
            }
            let Some(statements) = groups.get_mut(table) else {
                continue;
            };

            let mut dropped: BTreeSet<usize> = BTreeSet::new();
            for i in 0..statements.len() {
                let Some(NullabilityChange::MakesNullable { columns, .. }) =
                    nullability_change(&self.parser, &statements[i].text)
                else {
                    continue;
                };
                let introduced: BTreeSet<&String> = columns.iter().collect();

                let Some(end) = (i + 1..statements.len()).find(|&j| {
                    matches!(
                        nullability_change(&self.parser, &statements[j].text),
                        Some(NullabilityChange::SetsNotNull { columns: c, .. })
                            if c.iter().any(|col| introduced.contains(col))
                    )
                }) else {
                    continue;
                };

                for j in i + 1..end {
                    if statements[j].kind != StatementKind::Dml || dropped.contains(&j) {
                        continue;
                    }
                    let prompt = format!(
                        "column backfill on '{table}' lies between a nullable add and SET NOT NULL; drop it from the squash?\n  {}",
                        statements[j].text
                    );
                    match decider.confirm(&prompt) {
                        Decision::Yes => {
                            dropped.insert(j);
                        }
                        Decision::No => {}
                        Decision::Stop => {
                            stopped = true;
                            break;
                        }
                    }
                }
                if stopped {
                    break;
                }
            }

            if !dropped.is_empty() {
                let mut index = 0;
                statements.retain(|_| {
                    let keep = !dropped.contains(&index);
                    index += 1;
                    keep
                });
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render(
        &self,
        message: &str,
        depends: &BTreeSet<MigrationId>,
        consumed: &[&Migration],
        order: &[String],
        apply_groups: &BTreeMap<String, Vec<Sourced>>,
        unwind_order: &[String],
        rollback_groups: &BTreeMap<String, Vec<Sourced>>,
    ) -> String {
        let mut out = format!("-- {message}\n");
        if !depends.is_empty() {
            let ids: Vec<&str> = depends.iter().map(|d| d.as_str()).collect();
            out.push_str(&format!("-- depends: {}\n", ids.join(" ")));
        }
        for migration in consumed {
            out.push_str(&format!("-- squashed: {}\n", migration.id));
        }

        out.push_str("\n-- migrate: apply\n");
        for table in order {
            let Some(statements) = apply_groups.get(table) else {
                continue;
            };
            out.push_str(&group_header(table));
            for statement in statements {
                self.push_statement(&mut out, statement, consumed);
            }
        }

        out.push_str("\n-- migrate: rollback\n");
        // Reverse apply-discovery group order, and within each group reverse
        // the contributing migrations while keeping each migration's own
        // statement order.
        for table in unwind_order.iter().rev() {
            let Some(statements) = rollback_groups.get(table) else {
                continue;
            };
            out.push_str(&group_header(table));
            for source in (0..consumed.len()).rev() {
                for statement in statements.iter().filter(|s| s.source == source) {
                    self.push_statement(&mut out, statement, consumed);
                }
            }
        }
        out
    }

    fn push_statement(
        &self,
        out: &mut String,
        statement: &Sourced,
        consumed: &[&Migration],
    ) {
        if self.annotate_source {
            if let Some(migration) = consumed.get(statement.source) {
                out.push_str(&format!("-- source: {}\n", migration.id));
            }
        }
        out.push_str(&statement.text);
        out.push_str(";\n");
    }
}

fn group_header(table: &str) -> String {
    if table == DATA_GROUP {
        "\n-- Squash data statements.\n".to_string()
    } else {
        format!("\n-- Squash '{table}' statements.\n")
    }
}

#[cfg(test)]
#[path = "squash_test.rs"]
mod tests;
