//! Application configuration management.
//!
//! This module handles loading and saving the client configuration, which
//! includes the backend API URL, the account email used for re-authentication
//! and the network timeouts.
//!
//! Configuration is stored at `~/.config/creatoros/config.json`. The
//! `CREATOROS_API_URL` and `CREATOROS_EMAIL` environment variables override
//! the stored values.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "creatoros";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when neither the environment nor the config file name one.
pub const DEFAULT_API_URL: &str = "http://localhost:8003";

/// Environment variable overriding the backend API URL
pub const API_URL_ENV: &str = "CREATOROS_API_URL";

/// Environment variable overriding the account email
pub const EMAIL_ENV: &str = "CREATOROS_EMAIL";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// How long a caller waits for somebody else's in-flight refresh before
/// falling back to whatever credential is stored.
const DEFAULT_REFRESH_WAIT_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub account_email: Option<String>,
    pub request_timeout_secs: u64,
    pub refresh_wait_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            account_email: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            refresh_wait_ms: DEFAULT_REFRESH_WAIT_MS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `CREATOROS_API_URL` / `CREATOROS_EMAIL` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty(API_URL_ENV) {
            self.api_url = Some(url);
        }
        if let Some(email) = non_empty(EMAIL_ENV) {
            self.account_email = Some(email);
        }
        self
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> String {
        self.api_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_wait(&self) -> Duration {
        Duration::from_millis(self.refresh_wait_ms)
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
