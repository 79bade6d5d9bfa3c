//! Partsdesk CLI Entry Point
//!
//! Connects to the inventory database (prompting for credentials), then hands
//! the terminal to the interactive menu until the operator exits.
//!
//! Session events go to the log file; only errors appear on screen besides
//! the menu itself.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dialoguer::{Input, Password};

use partsdesk::config::{self, Credentials, DbSettings};
use partsdesk::{logging, Catalog, DeskError, PgDatabase, RetryPolicy, Session};

/// Partsdesk - interactive console for the electronics inventory database
#[derive(Parser, Debug)]
#[command(name = "partsdesk")]
#[command(about = "Browse and edit the electronics parts inventory")]
#[command(version)]
struct Cli {
    /// Database host (overrides DB_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Database port (overrides DB_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Database name (overrides DB_NAME)
    #[arg(long)]
    dbname: Option<String>,

    /// SSL mode: disable, allow, prefer, require (overrides DB_SSLMODE)
    #[arg(long)]
    sslmode: Option<String>,

    /// Session log file (overrides LOG_FILE)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Seconds to wait for the database before the first attempt
    #[arg(long, default_value_t = 5)]
    startup_delay: u64,

    /// Connection attempts before giving up
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Seconds between connection attempts
    #[arg(long, default_value_t = 2)]
    retry_delay: u64,
}

impl Cli {
    fn settings(&self) -> partsdesk::Result<DbSettings> {
        let mut settings = DbSettings::from_env()?;
        if let Some(host) = &self.host {
            settings.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(dbname) = &self.dbname {
            settings.database.clone_from(dbname);
        }
        if let Some(mode) = &self.sslmode {
            config::parse_ssl_mode(mode)?;
            settings.ssl_mode.clone_from(mode);
        }
        Ok(settings)
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            startup_delay: Duration::from_secs(self.startup_delay),
            attempts: self.retries,
            delay: Duration::from_secs(self.retry_delay),
        }
    }
}

fn prompt_credentials() -> anyhow::Result<Credentials> {
    let user: String = Input::new()
        .with_prompt("Enter login")
        .interact_text()
        .context("could not read login")?;
    let password = Password::new()
        .with_prompt("Enter password")
        .allow_empty_password(true)
        .interact()
        .context("could not read password")?;
    Ok(Credentials::new(user.trim(), password))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let log_file = cli.log_file.clone().unwrap_or_else(config::log_file_from_env);
    logging::init_file_logging(&log_file)
        .with_context(|| format!("could not open log file {}", log_file.display()))?;
    tracing::info!("Starting partsdesk");

    let settings = cli.settings()?;
    let policy = cli.retry_policy();
    let catalog = Catalog::inventory()?;

    println!("=== Database connection ===");
    let credentials = prompt_credentials()?;
    let pg_config = settings.pg_config(&credentials)?;

    println!("Waiting for PostgreSQL to start...");
    let mut stdout = io::stdout();
    let db = match PgDatabase::connect_with_retry(&pg_config, &policy, &mut stdout).await {
        Ok(db) => db,
        Err(err @ DeskError::ConnectionFailed(_)) => {
            eprintln!(
                "Check that PostgreSQL is running at {}:{} and the credentials are correct",
                settings.host, settings.port
            );
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };
    logging::record(&mut stdout, "Connected to the database")?;
    println!("Connected to the database successfully");
    stdout.flush()?;

    {
        let stdin = io::stdin();
        Session::new(&db, &catalog, stdin.lock(), io::stdout().lock()).run().await?;
    }
    drop(db);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
