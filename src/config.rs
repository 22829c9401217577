//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL and the last used username.
//!
//! Configuration is stored at `~/.config/haulbook/config.json`. The
//! `HAULBOOK_API_URL` environment variable (or a `.env` entry) overrides
//! the stored base URL.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "haulbook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default API base URL when neither the config file nor the environment
/// provides one
const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Pick up a local .env before reading the environment
        let _ = dotenvy::dotenv();

        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Resolved API base URL: environment beats the config file, which
    /// beats the built-in default.
    pub fn api_url(&self) -> String {
        std::env::var("HAULBOOK_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_defaults() {
        let config = Config::default();
        // No env override in tests unless the caller set one
        if std::env::var("HAULBOOK_API_URL").is_err() {
            assert_eq!(config.api_url(), DEFAULT_API_URL);
        }
    }

    #[test]
    fn test_api_url_prefers_stored_value() {
        if std::env::var("HAULBOOK_API_URL").is_ok() {
            return;
        }
        let config = Config {
            api_base_url: Some("https://api.example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_url(), "https://api.example.com");
    }
}
