//! Statement Builder
//!
//! Builds the handful of statement shapes the console issues. Table and column
//! names come from the [`Catalog`](crate::catalog::Catalog) and are written into
//! the SQL text; operator values are never interpolated and always travel as
//! `$N` positional parameters.
//!
//! Builders do not fail. Execution errors are reported by the
//! [`Database`](crate::engine::Database) that runs the statement.

use crate::catalog::{TableDescriptor, PRIMARY_KEY};
use crate::validate::ValidatedValue;

/// SQL text plus its ordered parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<String>,
}

impl Statement {
    fn new(sql: String, params: Vec<String>) -> Self {
        Self { sql, params }
    }

    /// Parameters as a JSON array, used in log lines
    #[must_use]
    pub fn params_json(&self) -> String {
        serde_json::to_string(&self.params).unwrap_or_else(|_| format!("{:?}", self.params))
    }
}

/// One `column = value` condition of a filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: String,
    pub value: ValidatedValue,
}

impl Condition {
    pub fn new(column: impl Into<String>, value: ValidatedValue) -> Self {
        Self { column: column.into(), value }
    }
}

/// Kind of statement, for log lines and dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Filter,
    Update,
    Insert,
    InsertRelated,
}

impl StatementKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Filter => "filter",
            Self::Update => "update",
            Self::Insert => "insert",
            Self::InsertRelated => "insert-related",
        }
    }
}

/// `$start, $start+1, ...` for `count` parameters
fn placeholders(start: usize, count: usize) -> String {
    (start..start + count).map(|i| format!("${i}")).collect::<Vec<_>>().join(", ")
}

/// `SELECT * FROM <table> ORDER BY id`
#[must_use]
pub fn select_all(table: &TableDescriptor) -> Statement {
    Statement::new(format!("SELECT * FROM {} ORDER BY {PRIMARY_KEY}", table.name()), Vec::new())
}

/// Conjunctive equality filter, parameters in condition order
///
/// An empty condition list degrades to [`select_all`].
#[must_use]
pub fn filter(table: &TableDescriptor, conditions: &[Condition]) -> Statement {
    if conditions.is_empty() {
        return select_all(table);
    }

    let clauses: Vec<String> = conditions
        .iter()
        .enumerate()
        .map(|(i, condition)| format!("{} = ${}", condition.column, i + 1))
        .collect();
    let params = conditions.iter().map(|c| c.value.as_str().to_string()).collect();

    Statement::new(
        format!(
            "SELECT * FROM {} WHERE {} ORDER BY {PRIMARY_KEY}",
            table.name(),
            clauses.join(" AND ")
        ),
        params,
    )
}

/// Set `column` to `value` on the rows whose id is in `ids`
///
/// One id yields `WHERE id = $2`; several yield `WHERE id IN ($2, $3, ...)`.
/// The caller offers only [`TableDescriptor::data_columns`], so `column` is
/// never `id`.
#[must_use]
pub fn update(
    table: &TableDescriptor,
    column: &str,
    value: &ValidatedValue,
    ids: &[ValidatedValue],
) -> Statement {
    let target = if ids.len() == 1 {
        format!("{PRIMARY_KEY} = $2")
    } else {
        format!("{PRIMARY_KEY} IN ({})", placeholders(2, ids.len()))
    };

    let mut params = Vec::with_capacity(ids.len() + 1);
    params.push(value.as_str().to_string());
    params.extend(ids.iter().map(|id| id.as_str().to_string()));

    Statement::new(format!("UPDATE {} SET {column} = $1 WHERE {target}", table.name()), params)
}

/// Insert one row; `values` line up with [`TableDescriptor::data_columns`]
#[must_use]
pub fn insert(table: &TableDescriptor, values: &[ValidatedValue]) -> Statement {
    debug_assert_eq!(values.len(), table.data_columns().len(), "one value per data column");

    let columns = table.data_columns();
    Statement::new(
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.name(),
            columns.join(", "),
            placeholders(1, columns.len())
        ),
        values.iter().map(|v| v.as_str().to_string()).collect(),
    )
}

/// [`insert`] followed by `RETURNING id`, for the parent row of a related insert
#[must_use]
pub fn insert_returning_id(table: &TableDescriptor, values: &[ValidatedValue]) -> Statement {
    let mut statement = insert(table, values);
    statement.sql.push_str(" RETURNING ");
    statement.sql.push_str(PRIMARY_KEY);
    statement
}
