//! Home-relative JSON config holding the database URL and the current user.
//!
//! The current user is session state for one process invocation, threaded
//! through dispatch explicitly; it is not a concurrency-safe shared value.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_FILE: &str = ".heronconfig.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHome,
    #[error("could not read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write config at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub db_url: String,
    #[serde(default)]
    pub current_user_name: Option<String>,
    #[serde(skip)]
    path: PathBuf,
}

impl Config {
    /// Read `~/.heronconfig.json`. Missing home directory or an unreadable
    /// file is fatal before any work starts.
    pub fn read() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        Self::load_from(home.join(CONFIG_FILE))
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let data = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let mut cfg: Config = serde_json::from_str(&data)?;
        cfg.path = path;
        Ok(cfg)
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current_user_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    /// Record `name` as the current user and persist the whole file.
    pub fn set_user(&mut self, name: &str) -> Result<(), ConfigError> {
        self.current_user_name = Some(name.to_string());
        self.persist()
    }

    fn persist(&self) -> Result<(), ConfigError> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.path, data).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
