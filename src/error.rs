//! Error types for the matchmaking engine
//!
//! Typed failures live in [`MatchmakingError`]; functions return the anyhow-based
//! [`Result`] alias so callers can either propagate with `?` or recover the typed
//! error with `downcast_ref`.

use crate::types::{GameMode, MatchId};

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific matchmaking scenarios
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchmakingError {
    #[error("Player with username '{username}' already exists")]
    DuplicateIdentity { username: String },

    #[error("Player '{username}' is already in the {mode} queue")]
    AlreadyQueued { username: String, mode: GameMode },

    #[error("Player not found: {username}")]
    PlayerNotFound { username: String },

    #[error("Unrecognized game mode: {value}")]
    UnrecognizedMode { value: String },

    #[error("Outcome for match {match_id} named non-participant '{winner}' as winner")]
    InvalidOutcome { match_id: MatchId, winner: String },

    #[error("Match {match_id} has already been processed")]
    MatchAlreadyProcessed { match_id: MatchId },

    #[error("Match {match_id} was not created by this engine")]
    UnknownMatch { match_id: MatchId },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal engine error: {message}")]
    InternalError { message: String },
}

impl MatchmakingError {
    /// Build the error used when a lock has been poisoned by a panicking writer
    pub(crate) fn poisoned(what: &str) -> Self {
        MatchmakingError::InternalError {
            message: format!("Failed to acquire {} lock", what),
        }
    }
}
