//! Queue manager owning one waiting list per mode
//!
//! Every mode's list sits behind its own mutex: enqueue, removal and the
//! scan-then-remove performed by [`QueueManager::take_pair`] are mutually
//! exclusive within a mode, while different modes never contend.

use crate::error::{MatchmakingError, Result};
use crate::matching::strategy::MatchStrategy;
use crate::queue::list::{ModeQueue, QueuedPlayer};
use crate::types::{GameMode, PairingKind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// A pair removed from a queue together with the rule that chose it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakenPair {
    pub first: QueuedPlayer,
    pub second: QueuedPlayer,
    pub pairing: PairingKind,
}

/// Per-mode waiting lists
#[derive(Debug)]
pub struct QueueManager {
    queues: [Mutex<ModeQueue>; GameMode::COUNT],
    next_ticket: AtomicU64,
}

impl Default for QueueManager {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueManager {
    pub fn new() -> Self {
        Self {
            queues: std::array::from_fn(|_| Mutex::new(ModeQueue::new())),
            next_ticket: AtomicU64::new(1),
        }
    }

    fn lock(&self, mode: GameMode) -> Result<MutexGuard<'_, ModeQueue>> {
        self.queues[mode.index()]
            .lock()
            .map_err(|_| MatchmakingError::poisoned(&format!("{} queue", mode)).into())
    }

    /// Issue a fresh membership ticket
    pub fn issue_ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::Relaxed)
    }

    /// Append to the back of `mode`'s queue.
    ///
    /// Rejects with [`MatchmakingError::AlreadyQueued`] if the same identity is
    /// already waiting there; the queue is left unchanged.
    pub fn enqueue(&self, mode: GameMode, entry: QueuedPlayer) -> Result<usize> {
        let mut queue = self.lock(mode)?;
        match queue.push_back(entry) {
            Ok(()) => Ok(queue.len()),
            Err(rejected) => {
                warn!("{} is already in the {} queue", rejected.username, mode);
                Err(MatchmakingError::AlreadyQueued {
                    username: rejected.username,
                    mode,
                }
                .into())
            }
        }
    }

    /// Remove one player, by identity key
    pub fn remove(&self, mode: GameMode, key: &str) -> Result<Option<QueuedPlayer>> {
        Ok(self.lock(mode)?.remove(key))
    }

    /// Remove exactly these two players, keeping everyone else in order.
    ///
    /// Returns `None` (and removes nothing) unless both are waiting in `mode`.
    pub fn remove_pair(
        &self,
        mode: GameMode,
        first: &str,
        second: &str,
    ) -> Result<Option<(QueuedPlayer, QueuedPlayer)>> {
        Ok(self.lock(mode)?.remove_pair(first, second))
    }

    /// Ask `strategy` for a pair and remove it, all under the mode's lock
    pub fn take_pair(
        &self,
        mode: GameMode,
        strategy: &dyn MatchStrategy,
    ) -> Result<Option<TakenPair>> {
        let mut queue = self.lock(mode)?;
        if queue.len() < 2 {
            return Ok(None);
        }

        let waiting: Vec<&QueuedPlayer> = queue.iter().collect();
        let Some(selection) = strategy.select_pair(&waiting) else {
            debug!(
                "No {} pair among {} waiting players ({})",
                mode,
                waiting.len(),
                strategy.name()
            );
            return Ok(None);
        };

        if selection.first >= selection.second || selection.second >= waiting.len() {
            return Err(MatchmakingError::InternalError {
                message: format!(
                    "Strategy {} selected invalid pair ({}, {}) from {} players",
                    strategy.name(),
                    selection.first,
                    selection.second,
                    waiting.len()
                ),
            }
            .into());
        }

        let first_key = waiting[selection.first].key.clone();
        let second_key = waiting[selection.second].key.clone();
        drop(waiting);

        let (first, second) = queue.remove_pair(&first_key, &second_key).ok_or_else(|| {
            MatchmakingError::InternalError {
                message: format!("Selected pair vanished from the {} queue", mode),
            }
        })?;

        Ok(Some(TakenPair {
            first,
            second,
            pairing: selection.pairing,
        }))
    }

    pub fn count(&self, mode: GameMode) -> Result<usize> {
        Ok(self.lock(mode)?.len())
    }

    /// Owned copy of `mode`'s queue, front first
    pub fn snapshot(&self, mode: GameMode) -> Result<Vec<QueuedPlayer>> {
        Ok(self.lock(mode)?.iter().cloned().collect())
    }

    /// Skill ratings of everyone waiting in `mode`, front first
    pub fn skill_ratings(&self, mode: GameMode) -> Result<Vec<i32>> {
        Ok(self
            .lock(mode)?
            .iter()
            .map(|entry| entry.skill_rating)
            .collect())
    }

    /// Which mode, if any, currently holds `key`
    pub fn find_mode(&self, key: &str) -> Result<Option<GameMode>> {
        for mode in GameMode::ALL {
            if self.lock(mode)?.contains(key) {
                return Ok(Some(mode));
            }
        }
        Ok(None)
    }
}
