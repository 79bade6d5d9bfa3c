//! Error Handling Infrastructure
//!
//! This module defines all error types used throughout Partsdesk.
//! Every error maps to a stable error code and carries a human-readable message.
//!
//! # Error Categories
//! - `InvalidCharacters`: Free-text value outside the input whitelist
//! - `NotANumber`: Value for a numeric column that does not parse as an integer
//! - `InvalidMenuChoice`: Menu or sub-menu input outside the offered range
//! - `ConnectionFailed`: Database connection errors (fatal at startup)
//! - `ExecutionError`: Statement failures reported by the database
//! - `NoMatchingRows`: A filter matched nothing (informational, not a failure)
//! - `ConfigError`: Invalid environment or command-line configuration
//! - `Io`: Console or log-file failures
//!
//! Hard errors render with an `Error` prefix. The session log echoes messages
//! containing that keyword to the console, so the prefix decides visibility.

use thiserror::Error;

/// Main error type for Partsdesk operations
#[derive(Error, Debug)]
pub enum DeskError {
    /// Value contains characters outside the whitelist
    #[error("Error: value for '{column}' contains invalid characters")]
    InvalidCharacters { column: String },

    /// Value for a numeric column is not an integer
    #[error("Error: field '{column}' must be a number")]
    NotANumber { column: String },

    /// Menu input outside the offered range
    #[error("Error: {0}")]
    InvalidMenuChoice(String),

    /// Database connection failed
    #[error("Error: connection failed: {0}")]
    ConnectionFailed(String),

    /// Statement execution failed
    #[error("Error: query execution failed: {0}")]
    ExecutionError(String),

    /// A filter matched no rows
    #[error("No records found for the given filters")]
    NoMatchingRows,

    /// Configuration error (bad environment variable, unknown SSL mode, etc.)
    #[error("Error: configuration: {0}")]
    ConfigError(String),

    /// Console or log-file I/O failure
    #[error("Error: I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl DeskError {
    /// Convert error to a stable error code string
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCharacters { .. } => "INVALID_CHARACTERS",
            Self::NotANumber { .. } => "NOT_A_NUMBER",
            Self::InvalidMenuChoice(_) => "INVALID_MENU_CHOICE",
            Self::ConnectionFailed(_) => "CONNECTION_FAILED",
            Self::ExecutionError(_) => "EXECUTION_ERROR",
            Self::NoMatchingRows => "NO_MATCHING_ROWS",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Get human-readable error message
    ///
    /// Never contains the database password.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Message without the `Error: <category>:` prefix
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidMenuChoice(detail)
            | Self::ConnectionFailed(detail)
            | Self::ExecutionError(detail)
            | Self::ConfigError(detail) => detail.clone(),
            Self::Io(err) => err.to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether the session can carry on after this error
    ///
    /// Everything except console/log I/O returns control to the menu.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }

    /// Create an invalid characters error
    pub fn invalid_characters(column: impl Into<String>) -> Self {
        Self::InvalidCharacters { column: column.into() }
    }

    /// Create a not-a-number error
    pub fn not_a_number(column: impl Into<String>) -> Self {
        Self::NotANumber { column: column.into() }
    }

    /// Create an invalid menu choice error
    pub fn invalid_menu_choice(message: impl Into<String>) -> Self {
        Self::InvalidMenuChoice(message.into())
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed(message.into())
    }

    /// Create an execution error
    pub fn execution_error(message: impl Into<String>) -> Self {
        Self::ExecutionError(message.into())
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }
}

/// Result type alias for Partsdesk operations
pub type Result<T> = std::result::Result<T, DeskError>;
