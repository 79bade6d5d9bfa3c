//! Partsdesk - Interactive Inventory Console
//!
//! Partsdesk is a menu-driven terminal client for a PostgreSQL database of
//! electronics parts (categories, manufacturers, components, stock). An
//! operator can browse tables, filter rows, update records by id, insert
//! records and insert linked parent/child pairs with the foreign key filled in
//! automatically.
//!
//! # Core Principles
//! - Fixed schema: only catalogued tables and columns reach SQL text
//! - Operator values are whitelisted and always bound as parameters
//! - Every failure returns to the main menu
//! - Everything is logged; errors are also shown on screen
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`catalog`] - Known tables, columns and relations
//! - [`validate`] - Input whitelist and numeric checks
//! - [`query`] - Parameterised statement builder
//! - [`relation`] - Foreign key resolution for related inserts
//! - [`output`] - Text table renderer
//! - [`engine`] - Database handle trait and the PostgreSQL implementation
//! - [`config`] - Connection settings
//! - [`logging`] - Session log
//! - [`session`] - Interactive menu

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;
pub mod query;
pub mod relation;
pub mod session;
pub mod validate;

// Re-export commonly used types for convenience
pub use catalog::{Catalog, RelationDescriptor, TableDescriptor};
pub use config::{Credentials, DbSettings};
pub use engine::postgres::PgDatabase;
pub use engine::{Database, ResultGrid, RetryPolicy};
pub use error::{DeskError, Result};
pub use query::{Condition, Statement, StatementKind};
pub use session::{MenuChoice, Session};
pub use validate::ValidatedValue;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_exports() {
        let catalog = Catalog::inventory().unwrap();
        assert_eq!(catalog.tables().len(), 4);
        assert_eq!(RetryPolicy::default().attempts, 3);
        assert_eq!(MenuChoice::parse("0").unwrap(), MenuChoice::Exit);
    }
}
