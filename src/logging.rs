//! Session Logging
//!
//! All events go through `tracing` into an append-only log file. Messages that
//! read as errors (they contain the word "error", any case) are also echoed
//! to the console with a timestamp; everything else stays in the file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

use crate::error::{DeskError, Result};

/// Timestamp layout shared by the log file and console echoes
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Install the file subscriber; `RUST_LOG` overrides the default `info` level
///
/// Creates the parent directory when missing.
pub fn init_file_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .try_init()
        .map_err(|e| DeskError::config_error(format!("could not install logger: {e}")))
}

/// Whether a message is shown on the console as well as logged
#[must_use]
pub fn is_error_message(message: &str) -> bool {
    message.to_lowercase().contains("error")
}

/// Log `message`; echo `[timestamp] message` to `console` when it is an error
pub fn record<W: Write + ?Sized>(console: &mut W, message: &str) -> Result<()> {
    if is_error_message(message) {
        tracing::error!("{message}");
        let now = chrono::Local::now().format(TIMESTAMP_FORMAT);
        writeln!(console, "[{now}] {message}")?;
    } else {
        tracing::info!("{message}");
    }
    Ok(())
}
