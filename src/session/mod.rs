//! Interactive Menu Session
//!
//! The session owns all console I/O. It reads operator choices, hands them to
//! the validator, statement builder, resolver and renderer, and runs the
//! resulting statements on the shared [`Database`] handle.
//!
//! Every failure inside an operation returns control to the main menu. Only
//! console I/O failures end the session; end of input behaves like choosing
//! `0`.

use std::io::{self, BufRead, Write};

use crate::catalog::{Catalog, TableDescriptor};
use crate::engine::{Database, ResultGrid};
use crate::error::{DeskError, Result};
use crate::logging;
use crate::output;
use crate::query::{self, Condition, Statement, StatementKind};
use crate::validate::{validate, validate_id, ValidatedValue};

mod related;

/// Highest main-menu entry
const MAX_MENU_CHOICE: u32 = 5;

/// Main menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    ViewTable,
    Filter,
    Update,
    Insert,
    InsertRelated,
}

impl MenuChoice {
    /// Parse the operator's answer to the main menu
    pub fn parse(input: &str) -> Result<Self> {
        match input.trim().parse::<u32>() {
            Ok(0) => Ok(Self::Exit),
            Ok(1) => Ok(Self::ViewTable),
            Ok(2) => Ok(Self::Filter),
            Ok(3) => Ok(Self::Update),
            Ok(4) => Ok(Self::Insert),
            Ok(5) => Ok(Self::InsertRelated),
            _ => Err(DeskError::invalid_menu_choice(format!(
                "enter a number from 0 to {MAX_MENU_CHOICE}"
            ))),
        }
    }
}

fn is_end_of_input(err: &DeskError) -> bool {
    matches!(err, DeskError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
}

/// Menu loop over one database handle
pub struct Session<'s, D, R, W> {
    db: &'s D,
    catalog: &'s Catalog,
    input: R,
    out: W,
}

impl<'s, D, R, W> Session<'s, D, R, W>
where
    D: Database,
    R: BufRead,
    W: Write,
{
    pub fn new(db: &'s D, catalog: &'s Catalog, input: R, out: W) -> Self {
        Self { db, catalog, input, out }
    }

    /// Run the menu until the operator exits or input ends
    pub async fn run(mut self) -> Result<()> {
        loop {
            self.print_main_menu()?;
            let line = match self.prompt("Choose a menu item: ") {
                Ok(line) => line,
                Err(e) if is_end_of_input(&e) => break,
                Err(e) => return Err(e),
            };

            let choice = match MenuChoice::parse(&line) {
                Ok(choice) => choice,
                Err(e) => {
                    self.report(&e)?;
                    continue;
                }
            };

            let outcome = match choice {
                MenuChoice::Exit => break,
                MenuChoice::ViewTable => self.view_table().await,
                MenuChoice::Filter => self.filter().await,
                MenuChoice::Update => self.update().await,
                MenuChoice::Insert => self.insert().await,
                MenuChoice::InsertRelated => self.insert_related().await,
            };

            match outcome {
                Ok(()) => {}
                Err(DeskError::NoMatchingRows) => {
                    writeln!(self.out, "{}", DeskError::NoMatchingRows)?;
                    self.log("Filter: no records found")?;
                }
                Err(e) if is_end_of_input(&e) => break,
                Err(e) if e.is_recoverable() => self.report(&e)?,
                Err(e) => return Err(e),
            }
        }

        writeln!(self.out, "Shutting down...")?;
        self.log("Session closed")?;
        self.out.flush()?;
        Ok(())
    }

    fn print_main_menu(&mut self) -> Result<()> {
        writeln!(self.out, "\n=== MENU ===")?;
        writeln!(self.out, "1. View table")?;
        writeln!(self.out, "2. Filter")?;
        writeln!(self.out, "3. Update record")?;
        writeln!(self.out, "4. Add record")?;
        writeln!(self.out, "5. Add record to related tables")?;
        writeln!(self.out, "0. Exit")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Console helpers
    // ------------------------------------------------------------------

    /// Next trimmed input line; end of input is `UnexpectedEof`
    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        Ok(line.trim().to_string())
    }

    fn prompt(&mut self, text: &str) -> Result<String> {
        write!(self.out, "{text}")?;
        self.out.flush()?;
        self.read_line()
    }

    /// Ask for a record/filter count of at least one
    fn read_count(&mut self, text: &str) -> Result<usize> {
        let line = self.prompt(text)?;
        match line.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(DeskError::invalid_menu_choice("enter a number greater than 0")),
        }
    }

    /// Numbered sub-menu; `None` when the operator picks `0`
    fn choose(&mut self, title: &str, question: &str, labels: &[String]) -> Result<Option<usize>> {
        writeln!(self.out, "\n=== {title} ===")?;
        for (i, label) in labels.iter().enumerate() {
            writeln!(self.out, "{}. {label}", i + 1)?;
        }
        writeln!(self.out, "0. Back to menu")?;

        let line = self.prompt(question)?;
        match line.parse::<usize>() {
            Ok(0) => Ok(None),
            Ok(n) if n <= labels.len() => Ok(Some(n - 1)),
            _ => Err(DeskError::invalid_menu_choice(format!(
                "choose a number from 0 to {}",
                labels.len()
            ))),
        }
    }

    fn choose_table(&mut self, title: &str) -> Result<Option<&'s TableDescriptor>> {
        let catalog = self.catalog;
        let labels: Vec<String> = catalog.tables().iter().map(|t| t.name().to_string()).collect();
        Ok(self.choose(title, "Choose a table: ", &labels)?.map(|i| &catalog.tables()[i]))
    }

    fn choose_column(&mut self, table: &'s TableDescriptor) -> Result<Option<&'s str>> {
        let title = format!("SELECT COLUMN IN TABLE '{}'", table.name());
        Ok(self
            .choose(&title, "Choose a column: ", table.columns())?
            .map(|i| table.columns()[i].as_str()))
    }

    /// Prompt for every data column of `table`, in declared order
    ///
    /// `linked` names a column whose value is already known (the foreign key
    /// of a related insert); it is filled in without a prompt.
    fn read_values(
        &mut self,
        table: &TableDescriptor,
        linked: Option<(&str, i64)>,
    ) -> Result<Vec<ValidatedValue>> {
        let mut values = Vec::with_capacity(table.data_columns().len());
        for column in table.data_columns() {
            match linked {
                Some((fk, id)) if fk == column.as_str() => {
                    writeln!(self.out, "  Set automatically: {column} = {id}")?;
                    values.push(ValidatedValue::from_id(id));
                }
                _ => {
                    let raw = self.prompt(&format!("Enter a value for '{column}': "))?;
                    values.push(validate(&raw, column)?);
                }
            }
        }
        Ok(values)
    }

    fn render(&mut self, grid: &ResultGrid) -> Result<()> {
        writeln!(self.out)?;
        write!(self.out, "{}", output::render(grid))?;
        Ok(())
    }

    fn log(&mut self, message: &str) -> Result<()> {
        logging::record(&mut self.out, message)
    }

    fn report(&mut self, err: &DeskError) -> Result<()> {
        logging::record(&mut self.out, &err.message())
    }

    fn log_statement(&mut self, kind: StatementKind, statement: &Statement) -> Result<()> {
        self.log(&format!(
            "Executing {}: {} with parameters {}",
            kind.as_str(),
            statement.sql,
            statement.params_json()
        ))
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// 1: show a whole table
    ///
    /// A bad table number or a failed query asks for the table again.
    async fn view_table(&mut self) -> Result<()> {
        loop {
            let table = match self.choose_table("SELECT TABLE TO VIEW") {
                Ok(Some(table)) => table,
                Ok(None) => return Ok(()),
                Err(e @ DeskError::InvalidMenuChoice(_)) => {
                    self.report(&e)?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let statement = query::select_all(table);
            self.log_statement(StatementKind::Select, &statement)?;
            let grid = match self.db.query(&statement).await {
                Ok(grid) => grid,
                Err(e @ DeskError::ExecutionError(_)) => {
                    self.report(&e)?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            self.render(&grid)?;
            return self
                .log(&format!("View table {}: found {} records", table.name(), grid.len()));
        }
    }

    /// 2: conjunctive equality filter over any columns
    async fn filter(&mut self) -> Result<()> {
        let count = self.read_count("\nEnter the number of filters (minimum 1): ")?;
        let Some(table) = self.choose_table("SELECT TABLE TO FILTER")? else {
            return Ok(());
        };

        let mut conditions = Vec::new();
        for i in 1..=count {
            writeln!(self.out, "\n=== Filter {i} of {count} ===")?;
            let Some(column) = self.choose_column(table)? else {
                return Ok(());
            };
            let raw = self.prompt(&format!("Enter the value to filter '{column}' by: "))?;
            conditions.push(Condition::new(column, validate(&raw, column)?));
        }

        let statement = query::filter(table, &conditions);
        self.log_statement(StatementKind::Filter, &statement)?;
        let grid = self.db.query(&statement).await?;
        if grid.is_empty() {
            return Err(DeskError::NoMatchingRows);
        }

        self.render(&grid)?;
        self.log(&format!("Filter table {}: found {} records", table.name(), grid.len()))
    }

    /// 3: set one column on one or more rows chosen by id
    async fn update(&mut self) -> Result<()> {
        let count = self.read_count("\nEnter the number of records to update (minimum 1): ")?;
        let Some(table) = self.choose_table("SELECT TABLE TO UPDATE")? else {
            return Ok(());
        };

        let mut ids = Vec::new();
        for i in 1..=count {
            let raw = self.prompt(&format!("Enter the ID of record {i} to update: "))?;
            ids.push(validate_id(&raw)?);
        }

        let title = format!("SELECT COLUMN TO UPDATE IN '{}'", table.name());
        let Some(idx) =
            self.choose(&title, "Choose a column to update: ", table.data_columns())?
        else {
            return Ok(());
        };
        let column = table.data_columns()[idx].as_str();

        let raw = self.prompt(&format!(
            "Enter the new value for '{column}' in table '{}': ",
            table.name()
        ))?;
        let value = validate(&raw, column)?;

        let statement = query::update(table, column, &value, &ids);
        self.log_statement(StatementKind::Update, &statement)?;
        let affected = self.db.execute(&statement).await?;

        writeln!(self.out, "Updated records: {affected}")?;
        self.log(&format!("Update table {}: {affected} records updated", table.name()))
    }

    /// 4: insert a batch of rows; the first failure ends the batch
    async fn insert(&mut self) -> Result<()> {
        let count = self.read_count("\nEnter the number of records to add (minimum 1): ")?;
        let Some(table) = self.choose_table("SELECT TABLE TO ADD TO")? else {
            return Ok(());
        };

        for i in 1..=count {
            writeln!(self.out, "\n=== Data for record {i} of {count} ===")?;
            let values = self.read_values(table, None)?;

            let statement = query::insert(table, &values);
            self.log_statement(StatementKind::Insert, &statement)?;
            self.db.execute(&statement).await?;

            writeln!(self.out, "Record {i} added successfully")?;
            self.log(&format!("Added a record to table {}", table.name()))?;
        }

        writeln!(self.out, "\nTotal records added: {count}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse("0").unwrap(), MenuChoice::Exit);
        assert_eq!(MenuChoice::parse("1").unwrap(), MenuChoice::ViewTable);
        assert_eq!(MenuChoice::parse(" 5 ").unwrap(), MenuChoice::InsertRelated);
    }

    #[test]
    fn test_menu_choice_rejects_out_of_range() {
        for input in ["6", "-1", "abc", "", "1.5"] {
            let err = MenuChoice::parse(input).unwrap_err();
            assert!(matches!(err, DeskError::InvalidMenuChoice(_)), "{input:?}");
            assert_eq!(err.message(), "Error: enter a number from 0 to 5");
        }
    }

    #[test]
    fn test_end_of_input_detection() {
        let eof = DeskError::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(is_end_of_input(&eof));
        assert!(!is_end_of_input(&DeskError::NoMatchingRows));
    }
}
