//! Main application configuration
//!
//! This module defines the configuration structures for the duel-parlor
//! matchmaking engine, including environment variable and TOML loading
//! and validation.

use crate::error::MatchmakingError;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub matchmaking: MatchmakingSettings,
    pub estimator: EstimatorSettings,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Pairing rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchmakingSettings {
    /// Maximum skill difference for a Ranked pair
    pub ranked_skill_window: u32,
    /// Maximum skill difference for a QuickPlay pair before overflow kicks in
    pub quick_play_skill_window: u32,
    /// QuickPlay force-matches the front two once more than this many wait
    pub quick_play_overflow_threshold: usize,
    /// Number of matches returned by a player history query
    pub recent_history_limit: usize,
}

/// Wait estimate thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorSettings {
    /// Ranked skill spread up to which the wait is "no wait"
    pub ranked_no_wait_spread: u32,
    /// Ranked skill spread up to which the wait is "short"
    pub ranked_short_wait_spread: u32,
    /// QuickPlay population at which the wait is "no wait"
    pub quick_play_no_wait_population: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "duel-parlor".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for MatchmakingSettings {
    fn default() -> Self {
        Self {
            ranked_skill_window: 2,
            quick_play_skill_window: 2,
            quick_play_overflow_threshold: 4,
            recent_history_limit: 3,
        }
    }
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            ranked_no_wait_spread: 2,
            ranked_short_wait_spread: 4,
            quick_play_no_wait_population: 5,
        }
    }
}

/// Parse an environment variable into `target` if it is set
fn override_from_env<T: FromStr>(name: &str, target: &mut T) -> Result<()> {
    if let Ok(raw) = env::var(name) {
        *target = raw
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", name, raw))?;
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        override_from_env("SERVICE_NAME", &mut config.service.name)?;
        override_from_env("LOG_LEVEL", &mut config.service.log_level)?;

        // Matchmaking settings
        override_from_env(
            "RANKED_SKILL_WINDOW",
            &mut config.matchmaking.ranked_skill_window,
        )?;
        override_from_env(
            "QUICK_PLAY_SKILL_WINDOW",
            &mut config.matchmaking.quick_play_skill_window,
        )?;
        override_from_env(
            "QUICK_PLAY_OVERFLOW_THRESHOLD",
            &mut config.matchmaking.quick_play_overflow_threshold,
        )?;
        override_from_env(
            "RECENT_HISTORY_LIMIT",
            &mut config.matchmaking.recent_history_limit,
        )?;

        // Estimator settings
        override_from_env(
            "RANKED_NO_WAIT_SPREAD",
            &mut config.estimator.ranked_no_wait_spread,
        )?;
        override_from_env(
            "RANKED_SHORT_WAIT_SPREAD",
            &mut config.estimator.ranked_short_wait_spread,
        )?;
        override_from_env(
            "QUICK_PLAY_NO_WAIT_POPULATION",
            &mut config.estimator.quick_play_no_wait_population,
        )?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }
}

/// Configuration failure as a typed error
fn invalid(message: impl Into<String>) -> anyhow::Error {
    MatchmakingError::ConfigurationError {
        message: message.into(),
    }
    .into()
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => {
            return Err(invalid(format!(
                "Invalid log level: {}",
                config.service.log_level
            )))
        }
    }

    if config.service.name.is_empty() {
        return Err(invalid("Service name cannot be empty"));
    }

    // Validate matchmaking settings
    if config.matchmaking.quick_play_overflow_threshold < 2 {
        return Err(invalid(
            "QuickPlay overflow threshold must be at least 2 players",
        ));
    }
    if config.matchmaking.recent_history_limit == 0 {
        return Err(invalid("Recent history limit must be greater than 0"));
    }

    // Validate estimator settings
    if config.estimator.ranked_no_wait_spread > config.estimator.ranked_short_wait_spread {
        return Err(invalid(
            "Ranked no-wait spread cannot exceed the short-wait spread",
        ));
    }
    if config.estimator.quick_play_no_wait_population < 2 {
        return Err(invalid(
            "QuickPlay no-wait population must be at least 2 players",
        ));
    }

    Ok(())
}
