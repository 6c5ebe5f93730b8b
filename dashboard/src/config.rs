//! Dashboard configuration
//!
//! Loaded from a TOML file with per-field defaults so a missing or partial
//! config still yields a usable dashboard.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the explorer REST backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Refresh interval for the overview view (stats, blocks, transactions).
    #[serde(default = "default_overview_refresh_secs")]
    pub overview_refresh_secs: u64,

    /// Refresh interval for the agents view (agents, tasks, events).
    #[serde(default = "default_agents_refresh_secs")]
    pub agents_refresh_secs: u64,

    /// Rows per page for server-side paginated feeds.
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// How many latest blocks to request per cycle.
    #[serde(default = "default_block_window")]
    pub block_window: u64,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_overview_refresh_secs() -> u64 {
    30
}

fn default_agents_refresh_secs() -> u64 {
    120
}

fn default_page_size() -> u64 {
    10
}

fn default_block_window() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout_secs(),
            overview_refresh_secs: default_overview_refresh_secs(),
            agents_refresh_secs: default_agents_refresh_secs(),
            page_size: default_page_size(),
            block_window: default_block_window(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from the given path, or from the default location, or fall back
    /// to defaults when no file exists.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::load(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Default config location under the user config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_default()
            .join("chainboard/config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.overview_refresh_secs, 30);
        assert_eq!(config.agents_refresh_secs, 120);
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("backend_url = \"http://node:9000\"").unwrap();
        assert_eq!(config.backend_url, "http://node:9000");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        assert!(serialized.contains("overview_refresh_secs"));
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.backend_url, config.backend_url);
    }
}
