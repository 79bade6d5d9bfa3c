//! `PostgreSQL` Database Handle
//!
//! Implements [`Database`] over a single `tokio-postgres` client.
//!
//! # Implementation Notes
//! - One connection per session; the connection task is spawned once
//! - Statements are prepared first so column headers are known even for
//!   empty result sets
//! - Parameters arrive as text and are converted to the type the server
//!   inferred for each placeholder (integers, floats, numeric, bool, date);
//!   text-like types are sent unchanged
//! - Cells are converted to display strings by column type; NULL is `""`
//! - BYTEA cells are Base64-encoded

use std::error::Error;

use tokio_postgres::types::private::BytesMut;
use tokio_postgres::types::{to_sql_checked, FromSql, IsNull, ToSql, Type};
use tokio_postgres::{Client, Config, NoTls, Row};

use crate::engine::{Database, ResultGrid, RetryPolicy};
use crate::error::{DeskError, Result};
use crate::query::Statement;

/// Live database session
pub struct PgDatabase {
    client: Client,
}

impl PgDatabase {
    /// Open the connection described by `config`
    pub async fn connect(config: &Config) -> Result<Self> {
        let (client, connection) = config.connect(NoTls).await.map_err(|e| {
            DeskError::connection_failed(format!("Failed to connect to PostgreSQL: {e}"))
        })?;

        // Connection errors never include the password
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Error: database connection closed: {e}");
            }
        });

        Ok(Self { client })
    }

    /// Connect and ping, retrying per `policy`
    ///
    /// Progress and failures are recorded in the session log and echoed to
    /// `console` when they are errors.
    pub async fn connect_with_retry<W: std::io::Write>(
        config: &Config,
        policy: &RetryPolicy,
        console: &mut W,
    ) -> Result<Self> {
        crate::engine::with_retries(policy, console, move || async move {
            let db = Self::connect(config).await?;
            db.ping().await?;
            Ok::<_, DeskError>(db)
        })
        .await
    }
}

impl Database for PgDatabase {
    async fn ping(&self) -> Result<()> {
        self.client
            .batch_execute("SELECT 1")
            .await
            .map_err(|e| DeskError::connection_failed(format!("Ping failed: {e}")))
    }

    async fn query(&self, statement: &Statement) -> Result<ResultGrid> {
        let prepared = self
            .client
            .prepare(&statement.sql)
            .await
            .map_err(|e| DeskError::execution_error(format!("Failed to prepare query: {e}")))?;

        let params = text_params(&statement.params);
        let rows = self
            .client
            .query(&prepared, &param_refs(&params))
            .await
            .map_err(|e| DeskError::execution_error(format!("Failed to execute query: {e}")))?;

        let headers = prepared.columns().iter().map(|c| c.name().to_string()).collect();
        let mut grid = ResultGrid::new(headers, Vec::with_capacity(rows.len()));
        for row in &rows {
            grid.push_row(row_to_cells(row)?);
        }
        Ok(grid)
    }

    async fn query_row(&self, statement: &Statement) -> Result<Vec<String>> {
        let params = text_params(&statement.params);
        let row = self
            .client
            .query_one(statement.sql.as_str(), &param_refs(&params))
            .await
            .map_err(|e| DeskError::execution_error(format!("Failed to execute query: {e}")))?;

        row_to_cells(&row)
    }

    async fn execute(&self, statement: &Statement) -> Result<u64> {
        let params = text_params(&statement.params);
        self.client
            .execute(statement.sql.as_str(), &param_refs(&params))
            .await
            .map_err(|e| DeskError::execution_error(format!("Failed to execute statement: {e}")))
    }
}

/// A text value bound to a placeholder of any type
///
/// The value is parsed into the placeholder's type at bind time; a value
/// that does not parse makes the statement fail.
#[derive(Debug)]
struct TextParam<'a>(&'a str);

impl ToSql for TextParam<'_> {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn Error + Sync + Send>> {
        let text = self.0.trim();
        match *ty {
            Type::INT2 => text.parse::<i16>()?.to_sql(ty, out),
            Type::INT4 => text.parse::<i32>()?.to_sql(ty, out),
            Type::INT8 => text.parse::<i64>()?.to_sql(ty, out),
            Type::FLOAT4 => text.parse::<f32>()?.to_sql(ty, out),
            Type::FLOAT8 => text.parse::<f64>()?.to_sql(ty, out),
            Type::NUMERIC => text.parse::<rust_decimal::Decimal>()?.to_sql(ty, out),
            Type::BOOL => parse_bool(text)?.to_sql(ty, out),
            Type::DATE => chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")?.to_sql(ty, out),
            _ => self.0.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn parse_bool(text: &str) -> std::result::Result<bool, Box<dyn Error + Sync + Send>> {
    match text.to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Ok(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("invalid boolean '{other}'").into()),
    }
}

fn text_params(params: &[String]) -> Vec<TextParam<'_>> {
    params.iter().map(|p| TextParam(p.as_str())).collect()
}

fn param_refs<'a>(params: &'a [TextParam<'a>]) -> Vec<&'a (dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

/// Convert every cell of a row to its display string
fn row_to_cells(row: &Row) -> Result<Vec<String>> {
    (0..row.len()).map(|idx| cell_to_string(row, idx)).collect()
}

/// Read an optional value of type `T` and render it with `Display`
fn display_cell<'a, T>(row: &'a Row, idx: usize) -> Result<String>
where
    T: FromSql<'a> + ToString,
{
    row.try_get::<_, Option<T>>(idx)
        .map(|value| value.map(|v| v.to_string()).unwrap_or_default())
        .map_err(|e| DeskError::execution_error(format!("Failed to read column {idx}: {e}")))
}

/// Convert one `PostgreSQL` cell to text
fn cell_to_string(row: &Row, idx: usize) -> Result<String> {
    let col_type = row.columns()[idx].type_();

    match *col_type {
        Type::BOOL => display_cell::<bool>(row, idx),
        Type::INT2 => display_cell::<i16>(row, idx),
        Type::INT4 => display_cell::<i32>(row, idx),
        Type::INT8 => display_cell::<i64>(row, idx),
        Type::OID => display_cell::<u32>(row, idx),
        Type::FLOAT4 => display_cell::<f32>(row, idx),
        Type::FLOAT8 => display_cell::<f64>(row, idx),
        Type::NUMERIC => display_cell::<rust_decimal::Decimal>(row, idx),
        Type::JSON | Type::JSONB => display_cell::<serde_json::Value>(row, idx),
        Type::UUID => display_cell::<uuid::Uuid>(row, idx),
        Type::DATE => display_cell::<chrono::NaiveDate>(row, idx),
        Type::TIME => display_cell::<chrono::NaiveTime>(row, idx),
        Type::TIMESTAMP => display_cell::<chrono::NaiveDateTime>(row, idx),
        Type::TIMESTAMPTZ => display_cell::<chrono::DateTime<chrono::Local>>(row, idx),
        Type::BYTEA => {
            use base64::Engine;
            let bytes: Option<Vec<u8>> = row.try_get(idx).map_err(|e| {
                DeskError::execution_error(format!("Failed to read bytea column {idx}: {e}"))
            })?;
            Ok(bytes
                .map(|b| base64::engine::general_purpose::STANDARD.encode(b))
                .unwrap_or_default())
        }
        // VARCHAR, TEXT, BPCHAR, NAME and anything else with a text form
        _ => row.try_get::<_, Option<String>>(idx).map(Option::unwrap_or_default).map_err(|e| {
            DeskError::execution_error(format!(
                "Cannot display PostgreSQL type '{}': {e}",
                col_type.name()
            ))
        }),
    }
}
