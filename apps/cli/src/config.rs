//! CLI configuration.
//!
//! Configuration is stored as TOML at `~/.config/aceup/config.toml`
//! (honoring `XDG_CONFIG_HOME`). Environment variables `ACEUP_API_KEY`,
//! `ACEUP_API_TOKEN` and `ACEUP_WORK_DIR` override the file.

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// aceup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// MirrorAce API key.
    #[serde(default)]
    pub api_key: String,

    /// MirrorAce API token.
    #[serde(default)]
    pub api_token: String,

    /// Where directory archives and split volumes are written.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Concurrent volume uploads for split files.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("aceup")
}

fn default_workers() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_token: String::new(),
            work_dir: default_work_dir(),
            workers: default_workers(),
        }
    }
}

impl Config {
    /// Loads configuration from disk and the environment.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_file_path()?;
        let mut config = match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text)
                .with_context(|| format!("invalid config at {}", path.display()))?,
            Err(_) => Self::default(),
        };

        if let Ok(value) = std::env::var("ACEUP_API_KEY") {
            config.api_key = value;
        }
        if let Ok(value) = std::env::var("ACEUP_API_TOKEN") {
            config.api_token = value;
        }
        if let Ok(value) = std::env::var("ACEUP_WORK_DIR") {
            config.work_dir = PathBuf::from(value);
        }

        if config.api_key.is_empty() || config.api_token.is_empty() {
            anyhow::bail!(
                "API credentials missing: set api_key/api_token in {} \
                 or the ACEUP_API_KEY/ACEUP_API_TOKEN environment variables",
                path.display()
            );
        }
        Ok(config)
    }
}

fn config_file_path() -> anyhow::Result<PathBuf> {
    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(dir).join("aceup").join("config.toml"));
    }
    let home = std::env::var("HOME").context("HOME not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("aceup")
        .join("config.toml"))
}
