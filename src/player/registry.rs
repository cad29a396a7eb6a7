//! In-memory player registry
//!
//! Owns every known player for the lifetime of the engine. Usernames are unique
//! case-insensitively; queue membership and win/loss records are mutated here
//! on behalf of the queue manager and the match processor.

use crate::error::{MatchmakingError, Result};
use crate::types::{GameMode, Player, PlayerId, PlayerRecord, QueueMembership};
use crate::utils::{current_timestamp, generate_player_id, identity_key};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct RegistryState {
    /// Players in creation order
    players: Vec<Player>,
    by_key: HashMap<String, usize>,
    by_id: HashMap<PlayerId, usize>,
}

impl RegistryState {
    fn find_mut(&mut self, username: &str) -> Result<&mut Player> {
        let slot = *self
            .by_key
            .get(&identity_key(username))
            .ok_or_else(|| MatchmakingError::PlayerNotFound {
                username: username.to_string(),
            })?;
        Ok(&mut self.players[slot])
    }

    fn find_by_id_mut(&mut self, player_id: PlayerId) -> Result<&mut Player> {
        let slot = *self
            .by_id
            .get(&player_id)
            .ok_or_else(|| MatchmakingError::PlayerNotFound {
                username: player_id.to_string(),
            })?;
        Ok(&mut self.players[slot])
    }
}

/// Registry of known players
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    state: RwLock<RegistryState>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RegistryState>> {
        self.state
            .read()
            .map_err(|_| MatchmakingError::poisoned("registry read").into())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, RegistryState>> {
        self.state
            .write()
            .map_err(|_| MatchmakingError::poisoned("registry write").into())
    }

    /// Register a new player.
    ///
    /// Fails with [`MatchmakingError::DuplicateIdentity`] if any existing
    /// username matches case-insensitively; nothing is stored in that case.
    pub fn create_player(
        &self,
        username: &str,
        skill_rating: i32,
        preferred_mode: GameMode,
    ) -> Result<Player> {
        let key = identity_key(username);
        let mut state = self.write()?;

        if state.by_key.contains_key(&key) {
            return Err(MatchmakingError::DuplicateIdentity {
                username: username.to_string(),
            }
            .into());
        }

        let player = Player {
            id: generate_player_id(),
            username: username.to_string(),
            skill_rating,
            preferred_mode,
            queue: None,
            record: PlayerRecord::default(),
            created_at: current_timestamp(),
        };

        let slot = state.players.len();
        state.players.push(player.clone());
        state.by_key.insert(key, slot);
        state.by_id.insert(player.id, slot);

        info!(
            "Registered player '{}' - skill: {}, preferred mode: {}",
            player.username, player.skill_rating, player.preferred_mode
        );
        Ok(player)
    }

    /// Owned snapshot of all players in creation order
    pub fn list_players(&self) -> Result<Vec<Player>> {
        Ok(self.read()?.players.clone())
    }

    /// Case-insensitive lookup by username
    pub fn get_player(&self, username: &str) -> Result<Player> {
        let state = self.read()?;
        state
            .by_key
            .get(&identity_key(username))
            .map(|slot| state.players[*slot].clone())
            .ok_or_else(|| {
                MatchmakingError::PlayerNotFound {
                    username: username.to_string(),
                }
                .into()
            })
    }

    pub fn get_player_by_id(&self, player_id: PlayerId) -> Result<Option<Player>> {
        let state = self.read()?;
        Ok(state
            .by_id
            .get(&player_id)
            .map(|slot| state.players[*slot].clone()))
    }

    pub fn player_count(&self) -> Result<usize> {
        Ok(self.read()?.players.len())
    }

    /// Mark a player as waiting in `mode`.
    ///
    /// Rejects with [`MatchmakingError::AlreadyQueued`] naming the mode the
    /// player currently waits in, whichever mode that is.
    pub fn begin_queue(
        &self,
        username: &str,
        mode: GameMode,
        ticket: u64,
        joined_at: DateTime<Utc>,
    ) -> Result<Player> {
        let mut state = self.write()?;
        let player = state.find_mut(username)?;

        if let Some(current) = &player.queue {
            return Err(MatchmakingError::AlreadyQueued {
                username: player.username.clone(),
                mode: current.mode,
            }
            .into());
        }

        player.queue = Some(QueueMembership {
            mode,
            joined_at,
            ticket,
        });
        Ok(player.clone())
    }

    /// Clear a player's membership if it still carries `ticket`.
    ///
    /// Returns the player as stored after the call.
    pub fn end_queue(&self, username: &str, ticket: u64) -> Result<Player> {
        let mut state = self.write()?;
        let player = state.find_mut(username)?;

        match &player.queue {
            Some(membership) if membership.ticket == ticket => {
                debug!(
                    "Cleared {} queue membership for '{}'",
                    membership.mode, player.username
                );
                player.queue = None;
            }
            _ => {}
        }
        Ok(player.clone())
    }

    /// Apply a resolved match outcome to both players' records
    pub fn record_outcome(&self, winner: PlayerId, loser: PlayerId) -> Result<()> {
        if winner == loser {
            return Err(MatchmakingError::InternalError {
                message: format!("Player {} cannot win against themselves", winner),
            }
            .into());
        }

        let mut state = self.write()?;

        // Resolve both before mutating either
        state.find_by_id_mut(loser)?;
        state.find_by_id_mut(winner)?.record.wins += 1;
        state.find_by_id_mut(loser)?.record.losses += 1;
        Ok(())
    }

    /// Poison the registry lock by panicking while holding it
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = self.state.write();
                    panic!("poisoning registry lock");
                })
                .join()
        });
    }
}
