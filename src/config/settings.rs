use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    pub fetch: FetchConfig,
}

/// Settings for outbound sitemap fetches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid timeout: {0} (must be between 1 and 300 seconds)")]
    InvalidTimeout(u64),
    #[error("Invalid retry count: {0} (must be at most 10)")]
    InvalidRetries(u32),
    #[error("Invalid user agent (cannot be empty)")]
    InvalidUserAgent,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Default for FetchConfig {
    #[inline]
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "sitekit-mcp/0.1.0 (Sitemap Analyzer)".to_string(),
            max_retries: 3,
            retry_delay_seconds: 2,
        }
    }
}

impl Config {
    #[inline]
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".sitekit-mcp"))
            .or({
                #[cfg(windows)]
                {
                    dirs::data_dir().map(|data| data.join("sitekit-mcp"))
                }
                #[cfg(not(windows))]
                {
                    None
                }
            })
            .ok_or(ConfigError::DirectoryError)
    }

    #[inline]
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    #[inline]
    pub fn load() -> Result<Self> {
        let config_path =
            Self::config_file_path().context("Failed to determine config file path")?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let config_dir = Self::config_dir().context("Failed to determine config directory")?;

        fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = config_dir.join("config.toml");
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fetch.validate()
    }
}

impl FetchConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err(ConfigError::InvalidTimeout(self.timeout_seconds));
        }

        if self.max_retries > 10 {
            return Err(ConfigError::InvalidRetries(self.max_retries));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidUserAgent);
        }

        Ok(())
    }
}
