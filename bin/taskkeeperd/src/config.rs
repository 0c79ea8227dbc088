//! Server configuration, loaded from a TOML file.
//!
//! ```toml
//! [storage]
//! data_dir = "./data"
//!
//! [http]
//! listen = "127.0.0.1:5000"
//! # cors_origin = "https://dashboard.example.com"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

const DB_FILE: &str = "taskkeeper.db";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the database file. Created on startup if absent.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("./data") }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Address the HTTP listener binds.
    pub listen: String,
    /// Origin allowed by CORS on the API. Absent or "*" allows any origin.
    pub cors_origin: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { listen: "127.0.0.1:5000".into(), cors_origin: None }
    }
}

impl ServerConfig {
    /// Load from `path`, or fall back to built-in defaults when no path
    /// is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Apply command-line overrides on top of the loaded file.
    pub fn apply_overrides(&mut self, listen: Option<String>, data_dir: Option<PathBuf>) {
        if let Some(listen) = listen {
            self.http.listen = listen;
        }
        if let Some(data_dir) = data_dir {
            self.storage.data_dir = data_dir;
        }
    }

    /// Path of the SQLite database file.
    pub fn db_path(&self) -> PathBuf {
        self.storage.data_dir.join(DB_FILE)
    }
}
