//! Runtime configuration.
//!
//! Plain JSON, strict: unknown keys are rejected, missing keys take the
//! defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Root directory; each ledger lives in `<data_dir>/<ledger_id>/`.
    pub data_dir: PathBuf,
    pub ledger_id: String,
    /// Snapshot every N commits. 0 disables snapshots.
    pub snapshot_interval: u64,
    /// fsync the journal after every commit.
    pub fsync: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            ledger_id: "mychannel".to_string(),
            snapshot_interval: 0,
            fsync: true,
        }
    }
}

impl RuntimeConfig {
    /// Default settings rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RuntimeConfig =
            serde_json::from_str(json).map_err(|e| RuntimeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Directory holding this ledger's journal and snapshots.
    pub fn ledger_dir(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_id)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let valid = !self.ledger_id.is_empty()
            && self
                .ledger_id
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
        if !valid {
            return Err(RuntimeError::Config(format!(
                "ledger_id {:?} must match [a-zA-Z0-9_-]+",
                self.ledger_id
            )));
        }
        Ok(())
    }
}
