//! Input Validation
//!
//! Every operator-typed value passes through here before it is bound to a
//! statement. Two rules apply:
//! - a whitelist of Latin and Cyrillic letters, digits, whitespace, hyphen
//!   and period (at least one character)
//! - integer parsing for the numeric columns of the inventory schema
//!
//! Validation is pure: no I/O, no database access.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::PRIMARY_KEY;
use crate::error::{DeskError, Result};

/// Columns whose values must parse as integers
///
/// `price` is included although prices could be fractional; the schema
/// accepts whole amounts only.
pub const NUMERIC_COLUMNS: [&str; 6] =
    ["price", "quantity", "founded_year", "category_id", "manufacturer_id", "component_id"];

// Whitespace is the ASCII set (tab, newline, form feed, carriage return, space).
static WHITELIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Zа-яА-ЯёЁ0-9\t\n\x0C\r \-.]+$").expect("whitelist pattern compiles")
});

/// A value that passed validation and may be bound as a statement parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedValue(String);

impl ValidatedValue {
    /// Wrap a database-generated id (always an integer, so always valid)
    #[must_use]
    pub fn from_id(id: i64) -> Self {
        Self(id.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether values for `column` must be integers
#[must_use]
pub fn is_numeric_column(column: &str) -> bool {
    NUMERIC_COLUMNS.contains(&column)
}

/// Whether `value` consists only of whitelisted characters
#[must_use]
pub fn is_whitelisted(value: &str) -> bool {
    WHITELIST.is_match(value)
}

/// Validate a free-text value destined for `column`
///
/// # Errors
/// - `InvalidCharacters` when the value is empty or has a character outside
///   the whitelist
/// - `NotANumber` when `column` is numeric and the value is not an integer
pub fn validate(value: &str, column: &str) -> Result<ValidatedValue> {
    if !is_whitelisted(value) {
        return Err(DeskError::invalid_characters(column));
    }

    if is_numeric_column(column) && value.parse::<i64>().is_err() {
        return Err(DeskError::not_a_number(column));
    }

    Ok(ValidatedValue(value.to_string()))
}

/// Validate a row identifier typed by the operator
///
/// # Errors
/// `NotANumber` for anything that does not parse as an integer.
pub fn validate_id(value: &str) -> Result<ValidatedValue> {
    value
        .parse::<i64>()
        .map(ValidatedValue::from_id)
        .map_err(|_| DeskError::not_a_number(PRIMARY_KEY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_latin_cyrillic_digits() {
        for value in ["Resistor", "Резистор 10к", "ёлка Ё", "LM-317.T", "2024", "a b\tc"] {
            let validated = validate(value, "name").unwrap();
            assert_eq!(validated.as_str(), value);
        }
    }

    #[test]
    fn test_rejects_characters_outside_whitelist() {
        for value in [
            "'; DROP TABLE stock; --",
            "a,b",
            "50%",
            "x_y",
            "name@example",
            "(1)",
            "Ünïcode",
            "+5",
        ] {
            let err = validate(value, "name").unwrap_err();
            assert!(
                matches!(err, DeskError::InvalidCharacters { ref column } if column == "name"),
                "{value:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_rejects_empty_value() {
        assert!(matches!(validate("", "description"), Err(DeskError::InvalidCharacters { .. })));
    }

    #[test]
    fn test_numeric_columns_require_integers() {
        for column in NUMERIC_COLUMNS {
            assert!(validate("42", column).is_ok());
            assert!(validate("-7", column).is_ok());

            let err = validate("12.50", column).unwrap_err();
            assert!(matches!(err, DeskError::NotANumber { column: ref c } if c == column));

            let err = validate("many", column).unwrap_err();
            assert!(matches!(err, DeskError::NotANumber { .. }));
        }
    }

    #[test]
    fn test_whitelist_checked_before_number() {
        let err = validate("1,5", "price").unwrap_err();
        assert!(matches!(err, DeskError::InvalidCharacters { .. }));
    }

    #[test]
    fn test_text_columns_accept_numeric_looking_values() {
        assert!(validate("12.50", "model").is_ok());
        assert!(validate("1984", "country").is_ok());
    }

    #[test]
    fn test_validate_id() {
        assert_eq!(validate_id("17").unwrap().as_str(), "17");
        let err = validate_id("seventeen").unwrap_err();
        assert!(matches!(err, DeskError::NotANumber { ref column } if column == "id"));
        assert!(validate_id("").is_err());
    }

    #[test]
    fn test_from_id() {
        assert_eq!(ValidatedValue::from_id(-3).to_string(), "-3");
        assert!(is_whitelisted(ValidatedValue::from_id(12_345).as_str()));
    }
}
