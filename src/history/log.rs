//! Append-only log of processed matches

use crate::error::{MatchmakingError, Result};
use crate::types::{Match, PlayerId};
use std::sync::{RwLock, RwLockReadGuard};

/// Processed matches in processing order
#[derive(Debug, Default)]
pub struct MatchHistory {
    matches: RwLock<Vec<Match>>,
}

impl MatchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Match>>> {
        self.matches
            .read()
            .map_err(|_| MatchmakingError::poisoned("history read").into())
    }

    /// Append a processed match, returning the new history length
    pub fn append(&self, processed: Match) -> Result<usize> {
        let mut matches = self
            .matches
            .write()
            .map_err(|_| MatchmakingError::poisoned("history write"))?;
        matches.push(processed);
        Ok(matches.len())
    }

    /// Owned copy of every processed match, oldest first
    pub fn snapshot(&self) -> Result<Vec<Match>> {
        Ok(self.read()?.clone())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Up to `limit` matches involving `player_id`, newest first
    pub fn player_history(&self, player_id: PlayerId, limit: usize) -> Result<Vec<Match>> {
        Ok(self
            .read()?
            .iter()
            .rev()
            .filter(|m| m.involves(player_id))
            .take(limit)
            .cloned()
            .collect())
    }

    /// Up to `limit` most recent matches, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<Match>> {
        Ok(self.read()?.iter().rev().take(limit).cloned().collect())
    }

    /// Mean skill difference across all processed matches, 0.0 when empty
    pub fn average_skill_difference(&self) -> Result<f64> {
        let matches = self.read()?;
        if matches.is_empty() {
            return Ok(0.0);
        }
        let total: u64 = matches.iter().map(|m| u64::from(m.skill_difference)).sum();
        Ok(total as f64 / matches.len() as f64)
    }
}
