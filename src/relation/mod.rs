//! Foreign Key Resolution
//!
//! Decides which column of the dependent table receives the id generated by
//! the parent insert. The decision table is fixed:
//! 1. `stock` children of `components` link through `component_id`
//! 2. `components` children link through `category_id` (parent `categories`)
//!    or `manufacturer_id` (parent `manufacturers`)
//! 3. otherwise the first non-`id` column of the child
//!
//! Rule 3 only exists for relations outside the inventory catalog and can pick
//! a column that is not a foreign key at all.

use crate::catalog::{RelationDescriptor, TableDescriptor, PRIMARY_KEY};

/// Foreign key column of `second` that references the relation's first table
///
/// Returns `None` only when `second` has no column besides `id`.
#[must_use]
pub fn resolve<'t>(relation: &RelationDescriptor, second: &'t TableDescriptor) -> Option<&'t str> {
    let first = relation.first();
    let candidate = |column: &str| -> Option<&'t str> {
        if !relation.foreign_keys().iter().any(|fk| fk == column) {
            return None;
        }
        second.columns().iter().find(|c| *c == column).map(String::as_str)
    };

    let known = if second.name().contains("stock") && first == "components" {
        candidate("component_id")
    } else if second.name().contains("components") {
        match first {
            "categories" => candidate("category_id"),
            "manufacturers" => candidate("manufacturer_id"),
            _ => None,
        }
    } else {
        None
    };

    known.or_else(|| {
        second.columns().iter().find(|c| c.as_str() != PRIMARY_KEY).map(String::as_str)
    })
}
