//! Client-side configuration.
//!
//! Reads/writes `~/.taskkeeper/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

/// Client configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server URL (e.g. "http://127.0.0.1:5000").
    #[serde(default = "default_server")]
    pub server: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { server: DEFAULT_SERVER.to_string() }
    }
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

impl ClientConfig {
    /// Default config file path: ~/.taskkeeper/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Return the taskkeeper config directory (~/.taskkeeper).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".taskkeeper")
}
