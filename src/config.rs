//! Shell configuration loaded from YAML.

use crate::handle::DEFAULT_QUEUE_DEPTH;
use crate::types::SortKey;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory name under the platform config/data dirs.
const APP_DIR: &str = "tasklist";

/// Config file name.
const CONFIG_FILE: &str = "config.yaml";

/// Settings for the `td` shell. Missing keys fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Sort key for a fresh store
    pub default_sort: SortKey,

    /// Colored output
    pub color: bool,

    /// Imported at start (if present) and exported on exit
    pub snapshot: Option<PathBuf>,

    /// Store actor queue capacity
    pub queue_depth: usize,

    /// Overrides the platform log directory
    pub log_dir: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            default_sort: SortKey::CreatedAt,
            color: true,
            snapshot: None,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            log_dir: None,
        }
    }
}

impl ShellConfig {
    /// `<config dir>/tasklist/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Load an explicit path (must exist), else the default path if it exists,
    /// else defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Directory for log files.
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("logs")
        })
    }
}
