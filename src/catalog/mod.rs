//! Static Table Catalog
//!
//! The console only works with a fixed set of inventory tables. Their names and
//! column lists live here and are the only identifiers ever interpolated into
//! SQL text. The catalog is built once at startup and passed by reference to
//! everything that needs it.

use crate::error::{DeskError, Result};

/// Name of the primary key column; always the first column of a table
pub const PRIMARY_KEY: &str = "id";

/// Table definition: name plus ordered columns
///
/// Column 0 is always the immutable primary key `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    name: String,
    columns: Vec<String>,
}

impl TableDescriptor {
    /// Create a descriptor; `id` is prepended to `data_columns`
    pub fn new(name: impl Into<String>, data_columns: &[&str]) -> Self {
        let mut columns = Vec::with_capacity(data_columns.len() + 1);
        columns.push(PRIMARY_KEY.to_string());
        columns.extend(data_columns.iter().map(|c| (*c).to_string()));
        Self { name: name.into(), columns }
    }

    /// Table name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All columns in declared order, `id` first
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Columns an operator may write: everything except `id`, in declared order
    #[must_use]
    pub fn data_columns(&self) -> &[String] {
        &self.columns[1..]
    }

    /// Whether the table declares `column`
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// A parent/child pair of tables used by the related-insert flow
///
/// `foreign_keys` lists the columns of the second table that may reference
/// the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDescriptor {
    first: String,
    second: String,
    foreign_keys: Vec<String>,
}

impl RelationDescriptor {
    pub fn new(first: impl Into<String>, second: impl Into<String>, foreign_keys: &[&str]) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            foreign_keys: foreign_keys.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// Referenced (parent) table name
    #[must_use]
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Dependent (child) table name
    #[must_use]
    pub fn second(&self) -> &str {
        &self.second
    }

    #[must_use]
    pub fn foreign_keys(&self) -> &[String] {
        &self.foreign_keys
    }

    /// Menu label, e.g. `components and stock`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} and {}", self.first, self.second)
    }
}

/// Immutable set of tables and relations for one run
#[derive(Debug, Clone)]
pub struct Catalog {
    tables: Vec<TableDescriptor>,
    relations: Vec<RelationDescriptor>,
}

impl Catalog {
    /// Build a catalog, checking every relation against the tables
    ///
    /// Both members must be known tables and every foreign key column must
    /// exist in the second one.
    pub fn new(tables: Vec<TableDescriptor>, relations: Vec<RelationDescriptor>) -> Result<Self> {
        for relation in &relations {
            for name in [relation.first(), relation.second()] {
                if !tables.iter().any(|t| t.name() == name) {
                    return Err(DeskError::config_error(format!(
                        "relation '{}' refers to unknown table '{name}'",
                        relation.label()
                    )));
                }
            }

            let second = tables.iter().find(|t| t.name() == relation.second());
            if let Some(missing) = relation
                .foreign_keys()
                .iter()
                .find(|fk| !second.is_some_and(|t| t.has_column(fk)))
            {
                return Err(DeskError::config_error(format!(
                    "relation '{}' uses unknown column '{missing}'",
                    relation.label()
                )));
            }
        }
        Ok(Self { tables, relations })
    }

    /// The electronics-parts inventory: four tables, three relations
    pub fn inventory() -> Result<Self> {
        Self::new(
            vec![
                TableDescriptor::new("categories", &["name", "description"]),
                TableDescriptor::new("manufacturers", &["name", "country", "founded_year"]),
                TableDescriptor::new(
                    "components",
                    &["name", "category_id", "manufacturer_id", "model", "price"],
                ),
                TableDescriptor::new("stock", &["component_id", "quantity", "warehouse_location"]),
            ],
            vec![
                RelationDescriptor::new("components", "stock", &["component_id"]),
                RelationDescriptor::new("categories", "components", &["category_id"]),
                RelationDescriptor::new("manufacturers", "components", &["manufacturer_id"]),
            ],
        )
    }

    #[must_use]
    pub fn tables(&self) -> &[TableDescriptor] {
        &self.tables
    }

    #[must_use]
    pub fn relations(&self) -> &[RelationDescriptor] {
        &self.relations
    }

    /// Look up a table by name
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name() == name)
    }

    /// Resolve both members of a relation to their descriptors
    pub fn relation_tables(
        &self,
        relation: &RelationDescriptor,
    ) -> Result<(&TableDescriptor, &TableDescriptor)> {
        let lookup = |name: &str| {
            self.table(name).ok_or_else(|| {
                DeskError::config_error(format!(
                    "relation '{}' refers to unknown table '{name}'",
                    relation.label()
                ))
            })
        };
        Ok((lookup(relation.first())?, lookup(relation.second())?))
    }
}
