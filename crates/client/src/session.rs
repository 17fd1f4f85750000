//! Persistent session cache (token + user) between client runs

use crate::error::{ClientError, Result};
use events_common::UserInfo;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform config directory
    pub fn default_location() -> Self {
        Self::new(events_common::session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached session. A missing or unreadable cache means logged out.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        match serde_json::from_str::<Session>(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!("Ignoring corrupt session cache {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        events_common::ensure_parent(&self.path)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        let content = serde_json::to_string_pretty(session)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| ClientError::Session(e.to_string()))?;
        info!("Saved session for {}", session.user.email);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| ClientError::Session(e.to_string()))?;
        }
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }
}
