mod config;
pub mod database;

pub use config::{Config, KettleConfig, LoggingConfig, SimulationConfig};
pub use database::{Database, MessageRecord};

use std::path::PathBuf;

/// Returns `$KETTLE_HOME` or `~/.config/kettle/`, creating it if needed.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> crate::error::Result<PathBuf> {
    let dir = match std::env::var_os("KETTLE_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("kettle"),
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Returns `<data_dir>/logs/`, which holds the log file and the message
/// database.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn logs_dir() -> crate::error::Result<PathBuf> {
    let dir = data_dir()?.join("logs");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
