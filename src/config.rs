//! `hubsync.toml`: where the two stores live and which tables hold the
//! params and the change log.

use std::fs;
use std::path::{Path, PathBuf};

use hubsync_engine::{SessionOptions, DEFAULT_LOG_TABLE, DEFAULT_PARAMS_TABLE};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HubsyncConfig {
    pub local: PathBuf,
    pub remote: PathBuf,
    pub params_table: String,
    pub log_table: String,
}

impl Default for HubsyncConfig {
    fn default() -> Self {
        Self {
            local: PathBuf::from("local.db"),
            remote: PathBuf::from("hub.db"),
            params_table: DEFAULT_PARAMS_TABLE.to_string(),
            log_table: DEFAULT_LOG_TABLE.to_string(),
        }
    }
}

impl HubsyncConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Command-line paths take precedence over the file.
    pub fn with_overrides(mut self, local: Option<PathBuf>, remote: Option<PathBuf>) -> Self {
        if let Some(local) = local {
            self.local = local;
        }
        if let Some(remote) = remote {
            self.remote = remote;
        }
        self
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            params_table: self.params_table.clone(),
            log_table: self.log_table.clone(),
        }
    }
}
