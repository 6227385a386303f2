//! Local filesystem state storage.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── config.toml           # Monitor configuration
//! ├── state.json            # Last-known products and listing counts
//! └── stats.json            # Counters from the latest poll cycle
//! ```
//!
//! All writes go to a temp file first and are renamed into place, so a
//! crash mid-write can never leave a torn `state.json` behind.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{CycleStats, MonitorState};
use crate::storage::StateStorage;

const STATE_FILE: &str = "state.json";
const STATS_FILE: &str = "stats.json";

/// Local filesystem state backend.
#[derive(Debug, Clone)]
pub struct LocalStateStore {
    root_dir: PathBuf,
}

impl LocalStateStore {
    /// Create a new store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl StateStorage for LocalStateStore {
    async fn load(&self) -> Result<MonitorState> {
        match self.read_bytes(STATE_FILE).await? {
            Some(bytes) => match serde_json::from_slice(&bytes) {
                Ok(state) => Ok(state),
                Err(e) => {
                    log::warn!("Unreadable {STATE_FILE} ({e}), starting with fresh state");
                    Ok(MonitorState::default())
                }
            },
            None => {
                log::info!("No {STATE_FILE} found, starting with fresh state");
                Ok(MonitorState::default())
            }
        }
    }

    async fn save(&self, state: &MonitorState) -> Result<()> {
        self.write_json(STATE_FILE, state).await
    }

    async fn save_stats(&self, stats: &CycleStats) -> Result<()> {
        self.write_json(STATS_FILE, stats).await
    }
}
