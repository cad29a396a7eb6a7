//! Configuration management for the duel-parlor engine
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values for the matchmaking engine.

pub mod app;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, EstimatorSettings, MatchmakingSettings, ServiceSettings};
