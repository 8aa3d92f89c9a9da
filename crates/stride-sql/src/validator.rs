//! Static lint over migration statements
//!
//! Runs syntax-level checks against each statement of a migration body and
//! collects findings. Findings are never fatal: the caller receives the full
//! ordered list and decides what to do with it. Nothing here touches a
//! database.

use crate::parser::SqlParser;
use serde::Serialize;
use sqlparser::ast::{AlterTableOperation, FromTable, Statement};
use sqlparser::keywords::ALL_KEYWORDS;

/// One lint finding, tied to a statement position within a body.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// Zero-based index of the statement within its body
    pub statement_index: usize,
    /// Human-readable description of the risk
    pub description: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "statement {}: {}", self.statement_index, self.description)
    }
}

/// Lint a body of raw statements, returning findings in statement order.
///
/// An empty result means clean.
pub fn lint_statements(parser: &SqlParser, statements: &[String]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (index, sql) in statements.iter().enumerate() {
        let stmt = match parser.parse_single(sql) {
            Ok(stmt) => stmt,
            Err(e) => {
                findings.push(Finding {
                    statement_index: index,
                    description: format!("statement could not be parsed: {e}"),
                });
                continue;
            }
        };

        check_keyword_identifiers(index, &stmt, &mut findings);
        check_unbounded_write(index, &stmt, &mut findings);
    }

    findings
}

/// Flag unquoted created identifiers that collide with SQL keywords.
///
/// sqlparser is more permissive than most databases, so a name it accepts
/// can still fail (or behave surprisingly) server-side.
fn check_keyword_identifiers(index: usize, stmt: &Statement, findings: &mut Vec<Finding>) {
    let mut idents: Vec<(&'static str, &sqlparser::ast::Ident)> = Vec::new();

    match stmt {
        Statement::CreateTable(create) => {
            for part in &create.name.0 {
                if let sqlparser::ast::ObjectNamePart::Identifier(ident) = part {
                    idents.push(("table", ident));
                }
            }
            for col in &create.columns {
                idents.push(("column", &col.name));
            }
        }
        Statement::AlterTable(alter) => {
            for op in &alter.operations {
                match op {
                    AlterTableOperation::AddColumn { column_def, .. } => {
                        idents.push(("column", &column_def.name));
                    }
                    AlterTableOperation::RenameColumn {
                        new_column_name, ..
                    } => {
                        idents.push(("column", new_column_name));
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }

    for (what, ident) in idents {
        if ident.quote_style.is_none() && is_keyword(&ident.value) {
            findings.push(Finding {
                statement_index: index,
                description: format!(
                    "{what} name '{}' is a SQL keyword; quote it or rename it",
                    ident.value
                ),
            });
        }
    }
}

/// Flag UPDATE/DELETE statements with no WHERE clause.
fn check_unbounded_write(index: usize, stmt: &Statement, findings: &mut Vec<Finding>) {
    let unbounded = match stmt {
        Statement::Update(update) => update.selection.is_none(),
        Statement::Delete(delete) => {
            let has_tables = match &delete.from {
                FromTable::WithFromKeyword(tables) => !tables.is_empty(),
                FromTable::WithoutKeyword(tables) => !tables.is_empty(),
            };
            has_tables && delete.selection.is_none()
        }
        _ => false,
    };

    if unbounded {
        findings.push(Finding {
            statement_index: index,
            description: "UPDATE/DELETE without a WHERE clause affects every row".to_string(),
        });
    }
}

/// Case-insensitive membership test against sqlparser's keyword table.
fn is_keyword(ident: &str) -> bool {
    let upper = ident.to_uppercase();
    ALL_KEYWORDS.binary_search(&upper.as_str()).is_ok()
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
