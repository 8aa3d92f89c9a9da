//! SQL parsing front end
//!
//! Stride targets two dialects, so dialect selection is a plain enum rather
//! than an open trait. sqlparser reports statement positions only inside its
//! error text; parse failures are post-processed to recover a line and
//! column for the error code.

use crate::error::{SqlError, SqlResult};
use sqlparser::ast::Statement;
use sqlparser::dialect::{Dialect, DuckDbDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

/// A supported SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlFlavor {
    Postgres,
    DuckDb,
}

impl SqlFlavor {
    /// Dialect name as written in configuration.
    pub fn name(self) -> &'static str {
        match self {
            SqlFlavor::Postgres => "postgres",
            SqlFlavor::DuckDb => "duckdb",
        }
    }

    fn dialect(self) -> &'static dyn Dialect {
        match self {
            SqlFlavor::Postgres => &PostgreSqlDialect {},
            SqlFlavor::DuckDb => &DuckDbDialect {},
        }
    }
}

/// Statement parser fixed to one dialect.
pub struct SqlParser {
    flavor: SqlFlavor,
}

impl SqlParser {
    pub fn postgres() -> Self {
        Self {
            flavor: SqlFlavor::Postgres,
        }
    }

    pub fn duckdb() -> Self {
        Self {
            flavor: SqlFlavor::DuckDb,
        }
    }

    /// Resolve a configured dialect name.
    pub fn from_dialect_name(name: &str) -> SqlResult<Self> {
        match name.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::postgres()),
            "duckdb" => Ok(Self::duckdb()),
            _ => Err(SqlError::UnknownDialect(name.to_string())),
        }
    }

    /// Parse SQL into AST statements.
    pub fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptySql);
        }

        Parser::parse_sql(self.flavor.dialect(), sql).map_err(|e| {
            let message = e.to_string();
            let (line, column) = error_location(&message);
            SqlError::ParseError {
                message,
                line,
                column,
            }
        })
    }

    /// Parse SQL and return the first statement.
    pub fn parse_single(&self, sql: &str) -> SqlResult<Statement> {
        let stmts = self.parse(sql)?;
        stmts.into_iter().next().ok_or(SqlError::EmptySql)
    }

    /// Name of the configured dialect.
    pub fn dialect_name(&self) -> &'static str {
        self.flavor.name()
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::postgres()
    }
}

/// Pull "Line: N, Column: M" back out of a sqlparser error string.
///
/// Missing or malformed markers yield 0 for that coordinate.
fn error_location(message: &str) -> (usize, usize) {
    let mut line = 0;
    let mut column = 0;
    for (label, slot) in [("Line: ", &mut line), ("Column: ", &mut column)] {
        if let Some(start) = message.rfind(label) {
            let digits: String = message[start + label.len()..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            *slot = digits.parse().unwrap_or(0);
        }
    }
    (line, column)
}
