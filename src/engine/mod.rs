//! Database Handle Trait and Core Types
//!
//! The menu controller talks to the database only through [`Database`]. The
//! production implementation is [`postgres::PgDatabase`]; tests drive the
//! session with an in-memory implementation.
//!
//! # Session Model
//! One handle is opened at startup and reused until the process exits. Calls
//! are strictly sequential; each call completes (or fails) before the next
//! menu step runs.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use crate::error::{DeskError, Result};
use crate::logging;
use crate::query::Statement;

pub mod postgres;

/// Result set converted to display strings
///
/// Every row has exactly `headers.len()` cells; NULL is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultGrid {
    /// Build a grid, padding short rows with empty cells and cutting long ones
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut grid = Self { headers, rows: Vec::with_capacity(rows.len()) };
        for row in rows {
            grid.push_row(row);
        }
        grid
    }

    /// Append a row, normalised to the header count
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Database handle used by the menu controller
///
/// Statements carry `$N` placeholders; parameters are bound in order.
pub trait Database {
    /// Check that the server answers
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    /// Run a statement that returns rows
    fn query(&self, statement: &Statement) -> impl Future<Output = Result<ResultGrid>> + Send;

    /// Run a statement that returns exactly one row (e.g. `RETURNING id`)
    fn query_row(&self, statement: &Statement)
        -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Run a statement that returns no rows; yields the affected row count
    fn execute(&self, statement: &Statement) -> impl Future<Output = Result<u64>> + Send;
}

/// Startup connection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait before the first attempt (database container warm-up)
    pub startup_delay: Duration,

    /// Total number of attempts
    pub attempts: u32,

    /// Pause between failed attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_secs(5),
            attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Run `attempt` until it succeeds or the policy is exhausted
///
/// Each failure is recorded in the session log (and therefore echoed to
/// `console`). The last failure is returned as `ConnectionFailed`.
pub async fn with_retries<T, F, Fut, W>(
    policy: &RetryPolicy,
    console: &mut W,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    W: Write,
{
    logging::record(console, "Waiting for PostgreSQL to start...")?;
    tokio::time::sleep(policy.startup_delay).await;

    let attempts = policy.attempts.max(1);
    let mut last_error = String::new();
    for n in 1..=attempts {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                last_error = err.detail();
                logging::record(
                    console,
                    &format!("Attempt {n}: connection check error: {last_error}"),
                )?;
                if n < attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    logging::record(console, "Error: could not connect to the database")?;
    Err(DeskError::connection_failed(last_error))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy { startup_delay: Duration::ZERO, attempts, delay: Duration::ZERO }
    }

    #[test]
    fn test_result_grid_normalises_rows() {
        let grid = ResultGrid::new(
            vec!["id".into(), "name".into()],
            vec![vec!["1".into()], vec!["2".into(), "b".into(), "extra".into()]],
        );
        assert_eq!(
            grid.rows,
            vec![vec!["1".to_string(), String::new()], vec!["2".into(), "b".into()]]
        );
        assert_eq!(grid.len(), 2);
        assert!(!grid.is_empty());
    }

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_with_retries_recovers() {
        let mut console = Vec::new();
        let mut calls = 0;
        let result = with_retries(&instant_policy(3), &mut console, || {
            calls += 1;
            let outcome = if calls < 3 {
                Err(DeskError::connection_failed("refused"))
            } else {
                Ok(calls)
            };
            async move { outcome }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        let echoed = String::from_utf8(console).unwrap();
        assert_eq!(echoed.matches("connection check error").count(), 2);
    }

    #[tokio::test]
    async fn test_with_retries_gives_up() {
        let mut console = Vec::new();
        let mut calls = 0;
        let result: Result<()> = with_retries(&instant_policy(3), &mut console, || {
            calls += 1;
            async { Err(DeskError::connection_failed("refused")) }
        })
        .await;

        assert_eq!(calls, 3);
        assert!(matches!(result, Err(DeskError::ConnectionFailed(ref m)) if m.contains("refused")));
        let echoed = String::from_utf8(console).unwrap();
        assert!(echoed.contains("Error: could not connect to the database"));
        assert!(!echoed.contains("Waiting for PostgreSQL"));
    }
}
