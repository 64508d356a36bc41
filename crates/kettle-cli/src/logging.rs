//! Log file setup.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use kettle_core::storage::{logs_dir, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to `<data_dir>/logs/<file>`.
///
/// `RUST_LOG` takes precedence over the configured level. The file is
/// truncated on each run unless `append` is set.
///
/// # Errors
/// Returns an error if the log file cannot be opened, the level is not a
/// valid filter, or a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = logs_dir()?.join(&config.file);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(config.append)
        .truncate(!config.append)
        .open(&path)?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| format!("initialize tracing subscriber: {err}"))?;
    Ok(path)
}
