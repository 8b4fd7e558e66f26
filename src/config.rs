//! Configuration management
//!
//! Handles loading and parsing of the JSON run configuration: which
//! indicators to compute and how.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::settings::IndicatorSettings;

/// Environment variable overriding [`Config::parallel`]
pub const PARALLEL_ENV: &str = "CHART_INDICATORS_PARALLEL";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Indicators to compute, in output order
    pub indicators: Vec<IndicatorSettings>,
    /// Evaluate indicators on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Repair and de-duplicate candles before computing
    #[serde(default = "default_true")]
    pub sanitize: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            indicators: IndicatorSettings::all_defaults(),
            parallel: true,
            sanitize: true,
        }
    }
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_json(&contents)?;

        if let Ok(value) = std::env::var(PARALLEL_ENV) {
            config.parallel = parse_flag(&value)
                .with_context(|| format!("Invalid {} value: {}", PARALLEL_ENV, value))?;
        }

        Ok(config)
    }

    /// Parse and validate configuration JSON
    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(contents).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every configured indicator
    pub fn validate(&self) -> Result<()> {
        for (i, settings) in self.indicators.iter().enumerate() {
            settings
                .validate()
                .with_context(|| format!("Invalid settings for indicator #{} ({})", i, settings.name()))?;
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
