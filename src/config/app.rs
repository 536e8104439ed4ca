//! Main application configuration
//!
//! Configuration comes from a TOML file or from environment variables,
//! falling back to defaults; CLI flags are applied on top in `main`.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub data: DataSettings,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Where leaderboard data lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// JSON snapshot file loaded at startup
    pub snapshot_path: PathBuf,
    /// Leaderboard shown when none is given on the command line
    pub default_leaderboard: Option<i64>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "ladder-board".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("leaderboards.json"),
            default_leaderboard: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still win
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&contents)?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| anyhow!("Invalid configuration file: {}", e))
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(path) = env::var("LADDER_DATA_FILE") {
            self.data.snapshot_path = PathBuf::from(path);
        }
        if let Ok(leaderboard) = env::var("LADDER_DEFAULT_LEADERBOARD") {
            self.data.default_leaderboard = Some(leaderboard.parse().map_err(|_| {
                anyhow!("Invalid LADDER_DEFAULT_LEADERBOARD value: {}", leaderboard)
            })?);
        }
        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.trim().is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    if config.data.snapshot_path.as_os_str().is_empty() {
        return Err(anyhow!("Snapshot path cannot be empty"));
    }

    if let Some(leaderboard) = config.data.default_leaderboard {
        if leaderboard <= 0 {
            return Err(anyhow!("Default leaderboard id must be positive"));
        }
    }

    Ok(())
}
