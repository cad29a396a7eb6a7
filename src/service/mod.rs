//! Service layer for the duel-parlor matchmaking engine
//!
//! This module contains the engine facade that ties the registry, queues,
//! matching, history and estimation together, plus the outcome collaborator.

pub mod engine;
pub mod simulator;

pub use engine::{MatchmakingEngine, QueueStats, SystemStats, STATS_RECENT_MATCHES};
pub use simulator::{CoinFlipSimulator, OutcomeSimulator};
