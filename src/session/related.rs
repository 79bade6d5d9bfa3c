//! Insert into a pair of related tables
//!
//! For each record the parent row is inserted first with `RETURNING id`; the
//! returned id then fills the child's foreign key column without a prompt.
//! The two inserts are separate statements. Once the parent row exists, any
//! failure in the child step (bad value, end of input, insert error) leaves
//! it in place, and the log says which row was kept.

use std::io::{BufRead, Write};

use super::Session;
use crate::catalog::{RelationDescriptor, TableDescriptor};
use crate::engine::Database;
use crate::error::{DeskError, Result};
use crate::query::{self, StatementKind};
use crate::relation::resolve as resolve_foreign_key;

/// Parse the id cell returned by `INSERT ... RETURNING id`
pub(crate) fn returned_id(row: &[String]) -> Result<i64> {
    row.first()
        .and_then(|cell| cell.trim().parse::<i64>().ok())
        .ok_or_else(|| DeskError::execution_error("insert did not return a numeric id"))
}

impl<'s, D, R, W> Session<'s, D, R, W>
where
    D: Database,
    R: BufRead,
    W: Write,
{
    /// 5: add linked parent/child rows for one of the catalogued relations
    pub(super) async fn insert_related(&mut self) -> Result<()> {
        let count =
            self.read_count("\nEnter the number of related records to add (minimum 1): ")?;

        let catalog = self.catalog;
        let labels: Vec<String> =
            catalog.relations().iter().map(RelationDescriptor::label).collect();
        let Some(idx) = self.choose("SELECT RELATED TABLES", "Choose related tables: ", &labels)?
        else {
            return Ok(());
        };
        let relation = &catalog.relations()[idx];
        let (first, second) = catalog.relation_tables(relation)?;

        let foreign_key = resolve_foreign_key(relation, second).ok_or_else(|| {
            DeskError::config_error(format!(
                "table '{}' has no column referencing '{}'",
                second.name(),
                first.name()
            ))
        })?;

        for i in 1..=count {
            writeln!(self.out, "\n=== Related records {i} of {count} ===")?;

            writeln!(self.out, "\n--- Data for table '{}' ---", first.name())?;
            let values = self.read_values(first, None)?;
            let statement = query::insert_returning_id(first, &values);
            self.log_statement(StatementKind::InsertRelated, &statement)?;
            let row = self.db.query_row(&statement).await?;
            let id = returned_id(&row)?;
            writeln!(self.out, "Record with ID {id} added to '{}'", first.name())?;

            if let Err(err) = self.insert_child(second, foreign_key, id).await {
                self.log(&format!(
                    "Error: insert into '{}' did not complete, row {id} in '{}' was kept",
                    second.name(),
                    first.name()
                ))?;
                return Err(err);
            }

            writeln!(self.out, "Record added to '{}'", second.name())?;
            self.log(&format!("Added related records to {}", relation.label()))?;
        }

        writeln!(self.out, "\nTotal related records added: {count}")?;
        Ok(())
    }

    /// Child half of a related insert, with `foreign_key` already known
    async fn insert_child(
        &mut self,
        second: &TableDescriptor,
        foreign_key: &str,
        id: i64,
    ) -> Result<()> {
        writeln!(self.out, "\n--- Data for table '{}' ---", second.name())?;
        writeln!(
            self.out,
            "Foreign key '{foreign_key}' = {id} will be set in '{}'",
            second.name()
        )?;
        let values = self.read_values(second, Some((foreign_key, id)))?;
        let statement = query::insert(second, &values);
        self.log_statement(StatementKind::InsertRelated, &statement)?;
        self.db.execute(&statement).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returned_id() {
        assert_eq!(returned_id(&["42".to_string()]).unwrap(), 42);
        assert_eq!(returned_id(&[" 7 ".to_string(), "x".to_string()]).unwrap(), 7);
    }

    #[test]
    fn test_returned_id_missing_or_garbled() {
        assert!(matches!(returned_id(&[]), Err(DeskError::ExecutionError(_))));
        assert!(matches!(returned_id(&[String::new()]), Err(DeskError::ExecutionError(_))));
        assert!(matches!(returned_id(&["abc".to_string()]), Err(DeskError::ExecutionError(_))));
    }
}
