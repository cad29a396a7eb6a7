//! Duel Parlor - in-memory 1v1 matchmaking engine
//!
//! This crate keeps a registry of players, one FIFO waiting queue per game
//! mode, mode-specific pairing rules, a history of resolved matches and coarse
//! wait estimates. Everything lives in memory behind a single
//! [`MatchmakingEngine`].

pub mod config;
pub mod error;
pub mod history;
pub mod matching;
pub mod metrics;
pub mod player;
pub mod queue;
pub mod service;
pub mod types;
pub mod utils;
pub mod wait_time;

// Re-export commonly used types and traits
pub use error::{MatchmakingError, Result};
pub use types::*;

// Re-export key components
pub use matching::{MatchStrategy, StrategyTable};
pub use service::{CoinFlipSimulator, MatchmakingEngine, OutcomeSimulator, SystemStats};
pub use wait_time::WaitEstimate;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
