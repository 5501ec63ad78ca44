//! Configuration loading for the Ticket Relay CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use tr_platform::config::{FalconCloud, ENV_FALCON_CLOUD};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Whether the service runs in production mode. Controls the logging
    /// profile.
    #[serde(default)]
    pub is_production: bool,

    /// Falcon cloud region. The `FALCON_CLOUD` environment variable wins
    /// when set.
    #[serde(default)]
    pub cloud: Option<String>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Logging section of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Log level name (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            is_production: false,
            cloud: None,
            logging: LoggingSection::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// The cloud region to use, honoring the environment override.
    pub fn effective_cloud(&self) -> Option<String> {
        std::env::var(ENV_FALCON_CLOUD)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.cloud.clone())
    }

    /// Validates the configuration, returning the list of problems.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if let Some(cloud) = &self.cloud {
            if let Err(err) = FalconCloud::parse(cloud) {
                problems.push(err.to_string());
            }
        }

        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            problems.push(format!("unknown log level: {}", self.logging.level));
        }

        problems
    }
}
