//! Per-statement analysis for squash and lint
//!
//! Classifies a single migration statement (DDL / DML / other) and extracts
//! the table it targets, best-effort. DDL identifiers come from the statement
//! head (CREATE/ALTER/DROP); `CREATE INDEX` resolves to the indexed table,
//! `DROP INDEX` can only name the index itself.

use crate::parser::SqlParser;
use serde::Serialize;
use sqlparser::ast::{
    AlterColumnOperation, AlterTableOperation, ColumnOption, FromTable, ObjectName,
    ObjectNamePart, Statement, TableFactor, TableObject,
};

/// Coarse statement classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    /// Schema-altering statement (CREATE/ALTER/DROP/...)
    Ddl,
    /// Data-affecting statement (INSERT/UPDATE/DELETE/TRUNCATE)
    Dml,
    /// Anything else (SELECT, SET, COMMENT, unparseable, ...)
    Other,
}

/// One analyzed statement from a migration body
#[derive(Debug, Clone, Serialize)]
pub struct ParsedStatement {
    /// Original statement text, untouched
    pub text: String,
    /// Coarse classification
    pub kind: StatementKind,
    /// Best-effort referenced table (None when not extractable)
    pub table: Option<String>,
}

/// Analyze one raw statement.
///
/// Statements the parser cannot understand are classified as
/// [`StatementKind::Other`] with no table; analysis never fails on bad input.
pub fn analyze_statement(parser: &SqlParser, sql: &str) -> ParsedStatement {
    let stmt = match parser.parse_single(sql) {
        Ok(stmt) => stmt,
        Err(_) => {
            return ParsedStatement {
                text: sql.to_string(),
                kind: StatementKind::Other,
                table: None,
            }
        }
    };

    let (kind, table) = classify(&stmt);
    ParsedStatement {
        text: sql.to_string(),
        kind,
        table,
    }
}

/// Classify a parsed statement and extract its target table.
fn classify(stmt: &Statement) -> (StatementKind, Option<String>) {
    match stmt {
        Statement::CreateTable(create) => {
            (StatementKind::Ddl, Some(object_name_to_string(&create.name)))
        }
        Statement::AlterTable(alter) => {
            (StatementKind::Ddl, Some(object_name_to_string(&alter.name)))
        }
        Statement::CreateIndex(index) => (
            StatementKind::Ddl,
            Some(object_name_to_string(&index.table_name)),
        ),
        Statement::CreateView(view) => {
            (StatementKind::Ddl, Some(object_name_to_string(&view.name)))
        }
        Statement::CreateExtension(ext) => (StatementKind::Ddl, Some(ext.name.value.clone())),
        Statement::DropExtension(drop_ext) => (
            StatementKind::Ddl,
            drop_ext.names.first().map(|n| n.value.clone()),
        ),
        // DROP INDEX names the index, not its table; grouping follows the
        // identifier we have, same as the reference behavior.
        Statement::Drop { names, .. } => (
            StatementKind::Ddl,
            names.first().map(object_name_to_string),
        ),
        Statement::Insert(insert) => {
            let table = match &insert.table {
                TableObject::TableName(name) => Some(object_name_to_string(name)),
                _ => None,
            };
            (StatementKind::Dml, table)
        }
        Statement::Update(update) => (
            StatementKind::Dml,
            table_factor_name(&update.table.relation),
        ),
        Statement::Delete(delete) => {
            let tables = match &delete.from {
                FromTable::WithFromKeyword(tables) => tables,
                FromTable::WithoutKeyword(tables) => tables,
            };
            (
                StatementKind::Dml,
                tables.first().and_then(|t| table_factor_name(&t.relation)),
            )
        }
        Statement::Truncate(truncate) => (
            StatementKind::Dml,
            truncate
                .table_names
                .first()
                .map(|t| object_name_to_string(&t.name)),
        ),
        _ => (StatementKind::Other, None),
    }
}

/// Render a (possibly qualified) object name without quoting.
pub fn object_name_to_string(name: &ObjectName) -> String {
    name.0
        .iter()
        .map(|part| match part {
            ObjectNamePart::Identifier(ident) => ident.value.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Table name from a FROM-clause factor, if it is a plain table.
fn table_factor_name(factor: &TableFactor) -> Option<String> {
    match factor {
        TableFactor::Table { name, .. } => Some(object_name_to_string(name)),
        _ => None,
    }
}

/// Direction of a column nullability change, for the squash elision heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NullabilityChange {
    /// Statement introduces nullable columns (CREATE TABLE with nullable
    /// columns, ADD COLUMN without NOT NULL, or ALTER COLUMN DROP NOT NULL)
    MakesNullable { table: String, columns: Vec<String> },
    /// Statement enforces NOT NULL on columns (ALTER COLUMN SET NOT NULL)
    SetsNotNull { table: String, columns: Vec<String> },
}

/// Detect whether a statement changes column nullability on some table.
pub fn nullability_change(parser: &SqlParser, sql: &str) -> Option<NullabilityChange> {
    let stmt = parser.parse_single(sql).ok()?;

    match &stmt {
        Statement::CreateTable(create) => {
            let table = object_name_to_string(&create.name);
            let columns: Vec<String> = create
                .columns
                .iter()
                .filter(|col| {
                    !col.options.iter().any(|opt| {
                        matches!(
                            opt.option,
                            ColumnOption::NotNull | ColumnOption::PrimaryKey(_)
                        )
                    })
                })
                .map(|col| col.name.value.clone())
                .collect();
            if columns.is_empty() {
                None
            } else {
                Some(NullabilityChange::MakesNullable { table, columns })
            }
        }
        Statement::AlterTable(alter) => {
            let table = object_name_to_string(&alter.name);
            let mut nullable = Vec::new();
            let mut not_null = Vec::new();
            for op in &alter.operations {
                match op {
                    AlterTableOperation::AlterColumn { column_name, op } => match op {
                        AlterColumnOperation::DropNotNull => {
                            nullable.push(column_name.value.clone());
                        }
                        AlterColumnOperation::SetNotNull => {
                            not_null.push(column_name.value.clone());
                        }
                        _ => {}
                    },
                    AlterTableOperation::AddColumn { column_def, .. } => {
                        let has_not_null = column_def
                            .options
                            .iter()
                            .any(|opt| matches!(opt.option, ColumnOption::NotNull));
                        if !has_not_null {
                            nullable.push(column_def.name.value.clone());
                        }
                    }
                    _ => {}
                }
            }
            if !not_null.is_empty() {
                Some(NullabilityChange::SetsNotNull {
                    table,
                    columns: not_null,
                })
            } else if !nullable.is_empty() {
                Some(NullabilityChange::MakesNullable {
                    table,
                    columns: nullable,
                })
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "statement_test.rs"]
mod tests;
