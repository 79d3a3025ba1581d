mod config;
pub mod database;

pub use config::{Config, SyncConfig, TimerConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::{CoreError, Result};

/// Returns `~/.config/worklog[-dev]/` based on WORKLOG_ENV.
///
/// Set WORKLOG_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WORKLOG_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("worklog-dev")
    } else {
        base_dir.join("worklog")
    };

    std::fs::create_dir_all(&dir).map_err(CoreError::Io)?;
    Ok(dir)
}
