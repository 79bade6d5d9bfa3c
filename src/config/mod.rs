//! Configuration Management
//!
//! Connection settings come from the environment (optionally seeded from a
//! `.env` file) and may be overridden on the command line. Credentials are
//! never read from the environment; the binary prompts for them.
//!
//! # Environment Variables
//! - `DB_HOST` (default `localhost`)
//! - `DB_PORT` (default `5432`)
//! - `DB_NAME` (default `postgres`)
//! - `DB_SSLMODE` (default `prefer`)
//! - `LOG_FILE` (default `/logs/app.log`)

use std::fmt;
use std::path::PathBuf;

use tokio_postgres::config::SslMode;
use tokio_postgres::Config;

use crate::error::{DeskError, Result};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_DATABASE: &str = "postgres";
pub const DEFAULT_SSL_MODE: &str = "prefer";
pub const DEFAULT_LOG_FILE: &str = "/logs/app.log";

/// Where to find the database (everything except credentials)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub ssl_mode: String,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            ssl_mode: DEFAULT_SSL_MODE.to_string(),
        }
    }
}

impl DbSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("DB_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                DeskError::config_error(format!("DB_PORT must be a port number, got '{raw}'"))
            })?,
            None => defaults.port,
        };

        let settings = Self {
            host: get("DB_HOST").unwrap_or(defaults.host),
            port,
            database: get("DB_NAME").unwrap_or(defaults.database),
            ssl_mode: get("DB_SSLMODE").unwrap_or(defaults.ssl_mode),
        };

        parse_ssl_mode(&settings.ssl_mode)?;
        Ok(settings)
    }

    /// Driver configuration for these settings and the given credentials
    pub fn pg_config(&self, credentials: &Credentials) -> Result<Config> {
        let mut config = Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .dbname(&self.database)
            .user(&credentials.user)
            .password(&credentials.password)
            .ssl_mode(parse_ssl_mode(&self.ssl_mode)?);
        Ok(config)
    }
}

/// Login typed at the startup prompt
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self { user: user.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Map a libpq-style `sslmode` value to the driver's mode
///
/// No TLS connector is linked in, so `require` and stricter modes fail at
/// connect time.
pub fn parse_ssl_mode(value: &str) -> Result<SslMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "disable" | "allow" => Ok(SslMode::Disable),
        "prefer" => Ok(SslMode::Prefer),
        "require" | "verify-ca" | "verify-full" => Ok(SslMode::Require),
        other => Err(DeskError::config_error(format!("unknown DB_SSLMODE '{other}'"))),
    }
}

/// Log file path from `LOG_FILE`, falling back to [`DEFAULT_LOG_FILE`]
#[must_use]
pub fn log_file_from_env() -> PathBuf {
    std::env::var("LOG_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = DbSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, DbSettings::default());
        assert_eq!(settings.port, 5432);
        assert_eq!(settings.ssl_mode, "prefer");
    }

    #[test]
    fn test_reads_environment() {
        let settings = DbSettings::from_lookup(lookup(&[
            ("DB_HOST", "db"),
            ("DB_PORT", "6543"),
            ("DB_NAME", "electronics"),
            ("DB_SSLMODE", "disable"),
        ]))
        .unwrap();
        assert_eq!(settings.host, "db");
        assert_eq!(settings.port, 6543);
        assert_eq!(settings.database, "electronics");
        assert_eq!(settings.ssl_mode, "disable");
    }

    #[test]
    fn test_empty_values_fall_back() {
        let settings =
            DbSettings::from_lookup(lookup(&[("DB_HOST", "  "), ("DB_PORT", "")])).unwrap();
        assert_eq!(settings.host, DEFAULT_HOST);
        assert_eq!(settings.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_port() {
        let err = DbSettings::from_lookup(lookup(&[("DB_PORT", "postgres")])).unwrap_err();
        assert!(matches!(err, DeskError::ConfigError(_)));
        assert!(err.message().contains("DB_PORT"));
    }

    #[test]
    fn test_ssl_modes() {
        assert!(matches!(parse_ssl_mode("disable"), Ok(SslMode::Disable)));
        assert!(matches!(parse_ssl_mode("allow"), Ok(SslMode::Disable)));
        assert!(matches!(parse_ssl_mode("Prefer"), Ok(SslMode::Prefer)));
        assert!(matches!(parse_ssl_mode("verify-full"), Ok(SslMode::Require)));
        assert!(matches!(parse_ssl_mode("sometimes"), Err(DeskError::ConfigError(_))));

        let err = DbSettings::from_lookup(lookup(&[("DB_SSLMODE", "sometimes")])).unwrap_err();
        assert!(err.message().contains("sometimes"));
    }

    #[test]
    fn test_pg_config() {
        let settings = DbSettings { host: "db".into(), port: 5433, ..DbSettings::default() };
        let config = settings.pg_config(&Credentials::new("store", "s3cret")).unwrap();
        assert_eq!(config.get_user(), Some("store"));
        assert_eq!(config.get_dbname(), Some("postgres"));
        assert_eq!(config.get_ports(), &[5433]);
        assert_eq!(config.get_password(), Some(&b"s3cret"[..]));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("store", "s3cret"));
        assert!(rendered.contains("store"));
        assert!(!rendered.contains("s3cret"));
    }
}
