//! Lifecycle of every match the engine has handed out
//!
//! A match id is registered as pending when the match is created and moves to
//! processed exactly once. `claim` is the only way from pending to resolving,
//! so concurrent or repeated processing of copies of one match cannot both
//! proceed.

use crate::error::{MatchmakingError, Result};
use crate::types::MatchId;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchState {
    Pending,
    Resolving,
    Processed,
}

/// Tracks which created matches still await an outcome
#[derive(Debug, Default)]
pub struct MatchLedger {
    states: Mutex<HashMap<MatchId, MatchState>>,
}

impl MatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<MatchId, MatchState>>> {
        self.states
            .lock()
            .map_err(|_| MatchmakingError::poisoned("match ledger").into())
    }

    /// Record a freshly created match as awaiting its outcome
    pub fn register(&self, match_id: MatchId) -> Result<()> {
        self.lock()?.insert(match_id, MatchState::Pending);
        Ok(())
    }

    /// Take exclusive ownership of a pending match for processing.
    ///
    /// Fails with [`MatchmakingError::MatchAlreadyProcessed`] if the match is
    /// being or has been processed, and [`MatchmakingError::UnknownMatch`] if
    /// it was never registered.
    pub fn claim(&self, match_id: MatchId) -> Result<()> {
        let mut states = self.lock()?;
        match states.get_mut(&match_id) {
            Some(state @ MatchState::Pending) => {
                *state = MatchState::Resolving;
                Ok(())
            }
            Some(_) => Err(MatchmakingError::MatchAlreadyProcessed { match_id }.into()),
            None => Err(MatchmakingError::UnknownMatch { match_id }.into()),
        }
    }

    /// Hand a claimed match back so it can be processed again
    pub fn release(&self, match_id: MatchId) -> Result<()> {
        let mut states = self.lock()?;
        if let Some(state) = states.get_mut(&match_id) {
            if *state == MatchState::Resolving {
                debug!("Match {} returned to pending", match_id);
                *state = MatchState::Pending;
            }
        }
        Ok(())
    }

    /// Mark a claimed match as processed for good
    pub fn complete(&self, match_id: MatchId) -> Result<()> {
        self.lock()?.insert(match_id, MatchState::Processed);
        Ok(())
    }

    /// Number of created matches still awaiting an outcome
    pub fn pending_count(&self) -> Result<usize> {
        Ok(self
            .lock()?
            .values()
            .filter(|state| **state != MatchState::Processed)
            .count())
    }
}
