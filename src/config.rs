//! Configuration loading and persistence

use anyhow::{Context, Result};
use log::{debug, info};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::api::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_PAGE_SIZE, DEFAULT_PLATFORM};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Bound on cached history pages per session.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            platform: default_platform(),
            page_size: default_page_size(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            // Use XDG config directory on Linux
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("watchdesk")
        } else {
            // Use home directory with dot prefix on Windows/Mac
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".watchdesk")
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from disk, falling back to defaults when the
    /// file does not exist. Also loads `.env` for credentials.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = Self::get_config_path()?;
        if !path.exists() {
            debug!("no config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        debug!("loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::get_config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Bearer token for the monitoring backend. Acquisition is external;
    /// we only read it from the environment.
    pub fn token() -> Result<String> {
        std::env::var("WATCHDESK_TOKEN")
            .context("WATCHDESK_TOKEN is not set. Export it or add it to .env")
    }
}

// Global Config instance
static CONFIG: OnceCell<Config> = OnceCell::new();

/// Initialize the global Config (called once at startup)
pub fn init(config: Config) -> Result<()> {
    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Config already initialized"))
}

/// Get a reference to the global Config
pub fn global() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: Config = toml::from_str("platform = \"xhs\"").unwrap();
        assert_eq!(config.platform, "xhs");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(config.api_base_url, "http://localhost:8000");
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config {
            api_base_url: "https://monitor.example.com".to_string(),
            platform: "xhs".to_string(),
            page_size: 50,
            cache_capacity: 16,
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.api_base_url, config.api_base_url);
        assert_eq!(parsed.cache_capacity, 16);
    }
}
