mod config;

pub use config::{CalendarConfig, Config, DayConfig, RemindersConfig};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/slotwise[-dev]/` based on SLOTWISE_ENV.
///
/// Set SLOTWISE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SLOTWISE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("slotwise-dev")
    } else {
        base_dir.join("slotwise")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
