use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{cache::DEFAULT_TTL, provider::cwa};

pub const API_KEY_ENV: &str = "CWA_API_KEY";
pub const PORT_ENV: &str = "PORT";
pub const UPSTREAM_URL_ENV: &str = "CWA_API_URL";

/// Server and upstream settings.
///
/// Example TOML:
/// ```toml
/// api_key = "CWA-XXXXXXXX"
/// port = 3000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CWA open-data authorization key. Weather requests fail until it is set.
    pub api_key: Option<String>,
    pub port: u16,
    pub bind: String,
    pub upstream_url: String,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            port: 3000,
            bind: "0.0.0.0".to_string(),
            upstream_url: cwa::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: cwa::DEFAULT_TIMEOUT.as_secs(),
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
        }
    }
}

impl Config {
    /// Load config from an explicit path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("tw", "tw-weather", "tw-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from the environment.
    ///
    /// `lookup` is usually `|k| std::env::var(k).ok()`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }

        if let Some(port) = lookup(PORT_ENV).filter(|p| !p.trim().is_empty()) {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid {PORT_ENV} value: {port}"))?;
        }

        if let Some(url) = lookup(UPSTREAM_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.upstream_url = url;
        }

        Ok(())
    }

    /// Returns the API key, if present and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }
}
