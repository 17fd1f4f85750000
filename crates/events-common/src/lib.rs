//! Shared types and directory management for the event manager
//!
//! Directory layout:
//! ```text
//! events_data/
//! ├── events/          # One JSON document per event
//! └── users.sqlite     # User accounts
//! ```
//!
//! The client keeps its session cache under the platform config directory
//! (`<config>/event_manager/session.json`).

pub mod date;
pub mod models;

pub use date::{date_only, parse_event_date, DateError};
pub use models::*;

use std::path::{Path, PathBuf};
use tracing::info;

const ROOT_ENV: &str = "EVENTS_ROOT";
const DEFAULT_ROOT: &str = "events_data";
const APP_DIR: &str = "event_manager";

/// Get the data root from `EVENTS_ROOT`, falling back to `events_data`
pub fn events_root() -> PathBuf {
    std::env::var(ROOT_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_ROOT))
}

/// Event documents directory under a data root
pub fn events_dir(root: &Path) -> PathBuf {
    root.join("events")
}

/// Users database path under a data root
pub fn users_db_path(root: &Path) -> PathBuf {
    root.join("users.sqlite")
}

/// Default location of the client's session cache
pub fn session_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("session.json")
}

/// Ensure a single directory exists
pub fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        info!("Created directory: {:?}", path);
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    Ok(())
}

/// Loose address check: `local@domain` with no whitespace
pub fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Canonical form used for uniqueness checks
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}
