//! Configuration for channel behavior.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file (JSON)
//! 3. Default values

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Channel behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Ceiling on activation steps driven by a single readiness event.
    pub step_budget: u32,
    /// Fold runs of adjacent data-ready events into a single entry.
    pub coalesce_data_ready: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            step_budget: 32,
            coalesce_data_ready: false,
        }
    }
}

impl ChannelConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = serde_json::from_str(&content).map_err(ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(budget) = std::env::var("SSH_CONDUIT_STEP_BUDGET") {
            if let Ok(budget) = budget.parse() {
                self.step_budget = budget;
            }
        }

        if let Ok(coalesce) = std::env::var("SSH_CONDUIT_COALESCE_DATA_READY") {
            if let Ok(coalesce) = coalesce.parse() {
                self.coalesce_data_ready = coalesce;
            }
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: env vars > config file > defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env();
        config.validate()?;

        Ok(config)
    }

    /// Check that the configuration values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_budget == 0 {
            return Err(ConfigError::ZeroStepBudget);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Step budget of zero would stall every activation.
    ZeroStepBudget,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::ZeroStepBudget => write!(f, "step_budget must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}
