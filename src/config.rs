// CLI configuration

use crate::error::{Result, TodoError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which persistence backend to use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// SQLite database file with a single `kv` table.
    #[default]
    Sqlite,
    /// Single JSON document on disk.
    File,
}

/// Terminal color behavior.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Colorize when stdout is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

/// Configuration loaded from a YAML file. Every field has a default, so a
/// partial (or missing) file is fine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the task store lives (default: platform data dir).
    pub store_path: Option<PathBuf>,
    /// Persistence backend.
    pub backend: Backend,
    /// Terminal color behavior.
    pub color: ColorMode,
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// An empty file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| TodoError::Config(e.to_string()))
    }

    /// Load from the given path, or from the default location.
    ///
    /// An explicitly given path must exist; a missing file at the default
    /// location just means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default = Self::default_config_path();
                if default.exists() {
                    Self::from_file(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Returns the default config file path: `<config_dir>/todostore/config.yaml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("todostore")
            .join("config.yaml")
    }

    /// Resolve where the task store lives: the explicit setting, or the
    /// platform data dir with a filename matching the backend.
    pub fn resolve_store_path(&self) -> PathBuf {
        match &self.store_path {
            Some(path) => path.clone(),
            None => {
                let file = match self.backend {
                    Backend::Sqlite => "tasks.db",
                    Backend::File => "tasks.json",
                };
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("todostore")
                    .join(file)
            }
        }
    }
}
