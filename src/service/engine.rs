//! Matchmaking engine facade
//!
//! [`MatchmakingEngine`] owns the registry, the per-mode queues, the match
//! engine, match history and the wait estimator. It is shared across tasks by
//! `Arc` and every operation takes `&self`.
//!
//! Lock ordering: a queue lock and the registry lock are never held together.
//! Enqueue marks the player in the registry before pushing to the queue; match
//! creation and leaving remove from the queue before clearing the registry.
//! Clears carry the enqueue ticket so a stale clear never erases a newer
//! membership.

use crate::config::{validate_config, AppConfig};
use crate::error::{MatchmakingError, Result};
use crate::history::{MatchHistory, MatchLedger};
use crate::matching::{MatchEngine, StrategyTable};
use crate::metrics::MetricsCollector;
use crate::player::PlayerRegistry;
use crate::queue::{QueueManager, QueuedPlayer};
use crate::service::simulator::OutcomeSimulator;
use crate::types::{GameMode, Match, Player};
use crate::utils::{current_timestamp, identity_key};
use crate::wait_time::{WaitEstimate, WaitEstimator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Number of recent matches reported by [`MatchmakingEngine::stats`]
pub const STATS_RECENT_MATCHES: usize = 5;

/// Waiting population of one mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub mode: GameMode,
    pub waiting: usize,
    pub estimate: WaitEstimate,
}

/// Point-in-time summary of the whole engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub total_players: usize,
    pub total_matches: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: i64,
    pub queues: Vec<QueueStats>,
    pub average_skill_difference: f64,
    /// Processed matches counted as recent, at most [`STATS_RECENT_MATCHES`]
    pub recent_matches: usize,
}

impl SystemStats {
    pub fn waiting_in(&self, mode: GameMode) -> usize {
        self.queues
            .iter()
            .find(|queue| queue.mode == mode)
            .map(|queue| queue.waiting)
            .unwrap_or(0)
    }
}

/// Central matchmaking state
pub struct MatchmakingEngine {
    config: AppConfig,
    registry: Arc<PlayerRegistry>,
    queues: Arc<QueueManager>,
    matcher: MatchEngine,
    history: MatchHistory,
    ledger: MatchLedger,
    estimator: WaitEstimator,
    simulator: Arc<dyn OutcomeSimulator>,
    metrics: Arc<MetricsCollector>,
    total_matches: AtomicU64,
    started_at: DateTime<Utc>,
}

impl MatchmakingEngine {
    /// Create an engine using the pairing rules described by `config`
    pub fn new(config: AppConfig, simulator: Arc<dyn OutcomeSimulator>) -> Result<Self> {
        let strategies = StrategyTable::from_settings(&config.matchmaking);
        Self::with_strategies(config, simulator, strategies)
    }

    /// Create an engine with an explicit strategy table
    pub fn with_strategies(
        config: AppConfig,
        simulator: Arc<dyn OutcomeSimulator>,
        strategies: StrategyTable,
    ) -> Result<Self> {
        validate_config(&config)?;

        let registry = Arc::new(PlayerRegistry::new());
        let queues = Arc::new(QueueManager::new());
        let metrics = Arc::new(MetricsCollector::new()?);
        let matcher = MatchEngine::new(
            queues.clone(),
            registry.clone(),
            strategies,
            metrics.clone(),
        );
        let estimator = WaitEstimator::new(config.estimator.clone());

        info!(
            "Matchmaking engine '{}' ready - ranked window: {}, \
             quick play window: {}, overflow threshold: {}",
            config.service.name,
            config.matchmaking.ranked_skill_window,
            config.matchmaking.quick_play_skill_window,
            config.matchmaking.quick_play_overflow_threshold
        );

        Ok(Self {
            config,
            registry,
            queues,
            matcher,
            history: MatchHistory::new(),
            ledger: MatchLedger::new(),
            estimator,
            simulator,
            metrics,
            total_matches: AtomicU64::new(0),
            started_at: current_timestamp(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    // Player registry

    /// Register a new, unqueued player
    pub fn create_player(
        &self,
        username: &str,
        skill_rating: i32,
        preferred_mode: GameMode,
    ) -> Result<Player> {
        match self
            .registry
            .create_player(username, skill_rating, preferred_mode)
        {
            Ok(player) => {
                self.metrics
                    .record_player_registered(self.registry.player_count()?);
                Ok(player)
            }
            Err(err) => {
                if let Some(MatchmakingError::DuplicateIdentity { .. }) = err.downcast_ref() {
                    warn!("Rejected registration: {}", err);
                    self.metrics.record_duplicate_registration();
                }
                Err(err)
            }
        }
    }

    pub fn list_players(&self) -> Result<Vec<Player>> {
        self.registry.list_players()
    }

    pub fn get_player(&self, username: &str) -> Result<Player> {
        self.registry.get_player(username)
    }

    // Queues

    /// Put a registered player at the back of `mode`'s queue.
    ///
    /// Fails with [`MatchmakingError::AlreadyQueued`] if the player is waiting
    /// in any queue, and with [`MatchmakingError::PlayerNotFound`] for unknown
    /// usernames. Nothing changes on failure.
    pub fn enqueue(&self, username: &str, mode: GameMode) -> Result<Player> {
        let ticket = self.queues.issue_ticket();
        let joined_at = current_timestamp();

        let player = match self.registry.begin_queue(username, mode, ticket, joined_at) {
            Ok(player) => player,
            Err(err) => {
                if let Some(MatchmakingError::AlreadyQueued { .. }) = err.downcast_ref() {
                    warn!("Rejected {} enqueue: {}", mode, err);
                    self.metrics.record_queue_rejection(mode, "already_queued");
                }
                return Err(err);
            }
        };

        let entry = QueuedPlayer {
            player_id: player.id,
            username: player.username.clone(),
            key: identity_key(&player.username),
            skill_rating: player.skill_rating,
            ticket,
            joined_at,
        };

        let depth = match self.queues.enqueue(mode, entry) {
            Ok(depth) => depth,
            Err(err) => {
                self.registry.end_queue(&player.username, ticket)?;
                self.metrics.record_queue_rejection(mode, "already_queued");
                return Err(err);
            }
        };

        self.metrics.record_queue_join(mode, depth);
        info!(
            "Player '{}' (skill {}) joined the {} queue at position {}",
            player.username, player.skill_rating, mode, depth
        );
        Ok(player)
    }

    /// Queue each player again in their preferred mode.
    ///
    /// Failures are logged and skipped; returns how many players were queued.
    pub fn requeue_players(&self, players: &[Player]) -> usize {
        let mut requeued = 0;
        for player in players {
            match self.enqueue(&player.username, player.preferred_mode) {
                Ok(_) => requeued += 1,
                Err(err) => warn!("Could not re-queue '{}': {}", player.username, err),
            }
        }
        requeued
    }

    /// Remove a player from whichever queue holds them.
    ///
    /// Returns `false` when the player was not waiting anywhere.
    pub fn leave_queue(&self, username: &str) -> Result<bool> {
        let player = self.registry.get_player(username)?;
        let Some(membership) = player.queue else {
            debug!("'{}' asked to leave but is not queued", player.username);
            return Ok(false);
        };

        let Some(entry) = self
            .queues
            .remove(membership.mode, &identity_key(&player.username))?
        else {
            // Already taken into a match; the matcher clears the membership
            return Ok(false);
        };

        self.registry.end_queue(&entry.username, entry.ticket)?;
        self.metrics
            .record_queue_leave(membership.mode, self.queues.count(membership.mode)?);
        info!(
            "Player '{}' left the {} queue",
            entry.username, membership.mode
        );
        Ok(true)
    }

    pub fn queue_count(&self, mode: GameMode) -> Result<usize> {
        self.queues.count(mode)
    }

    /// Players waiting in `mode`, front of the queue first
    pub fn queue_snapshot(&self, mode: GameMode) -> Result<Vec<Player>> {
        let entries = self.queues.snapshot(mode)?;
        let mut players = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(player) = self.registry.get_player_by_id(entry.player_id)? {
                players.push(player);
            }
        }
        Ok(players)
    }

    // Matching

    /// Try to form one match in `mode`; `Ok(None)` when no pair is available
    pub fn try_create_match(&self, mode: GameMode) -> Result<Option<Match>> {
        let created = self.matcher.try_create_match(mode)?;
        if let Some(pending) = &created {
            self.ledger.register(pending.id)?;
        }
        Ok(created)
    }

    /// Resolve a created match and record it.
    ///
    /// Only matches returned by [`Self::try_create_match`] are accepted, each
    /// at most once; copies of a processed match fail with
    /// [`MatchmakingError::MatchAlreadyProcessed`] and foreign matches with
    /// [`MatchmakingError::UnknownMatch`]. The outcome simulator is consulted
    /// exactly once per successful call. A winner that is not a participant is
    /// rejected with [`MatchmakingError::InvalidOutcome`] and nothing is
    /// recorded; the match stays pending.
    pub fn process_match(&self, mut pending: Match) -> Result<Match> {
        if pending.is_processed() {
            return Err(MatchmakingError::MatchAlreadyProcessed {
                match_id: pending.id,
            }
            .into());
        }

        self.ledger.claim(pending.id)?;

        let winner = self.simulator.simulate(&pending);
        let loser = match pending.opponent_of(winner).map(|player| player.id) {
            Some(loser) if loser != winner => loser,
            _ => {
                error!(
                    "Outcome for match {} named non-participant {}",
                    pending.id, winner
                );
                self.metrics.record_invalid_outcome();
                self.ledger.release(pending.id)?;
                return Err(MatchmakingError::InvalidOutcome {
                    match_id: pending.id,
                    winner: winner.to_string(),
                }
                .into());
            }
        };

        if let Err(err) = self.registry.record_outcome(winner, loser) {
            self.ledger.release(pending.id)?;
            return Err(err);
        }
        self.ledger.complete(pending.id)?;
        pending.winner = Some(winner);

        for participant in [&mut pending.player1, &mut pending.player2] {
            if let Some(current) = self.registry.get_player_by_id(participant.id)? {
                participant.record = current.record;
            }
        }

        self.history.append(pending.clone())?;
        let total = self.total_matches.fetch_add(1, Ordering::SeqCst) + 1;
        self.metrics.record_match_processed(pending.mode);

        info!("Processed match {} ({} total): {}", pending.id, total, pending);
        Ok(pending)
    }

    // Reporting

    pub fn estimate_wait(&self, mode: GameMode) -> Result<WaitEstimate> {
        let skills = self.queues.skill_ratings(mode)?;
        Ok(self.estimator.estimate(mode, &skills))
    }

    /// Every processed match, oldest first
    pub fn match_history(&self) -> Result<Vec<Match>> {
        self.history.snapshot()
    }

    /// Most recent matches involving `username`, newest first
    pub fn player_history(&self, username: &str) -> Result<Vec<Match>> {
        self.player_history_with_limit(username, self.config.matchmaking.recent_history_limit)
    }

    pub fn player_history_with_limit(&self, username: &str, limit: usize) -> Result<Vec<Match>> {
        let player = self.registry.get_player(username)?;
        self.history.player_history(player.id, limit)
    }

    pub fn total_matches(&self) -> u64 {
        self.total_matches.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> Result<SystemStats> {
        let now = current_timestamp();

        let mut queues = Vec::with_capacity(GameMode::COUNT);
        for mode in GameMode::ALL {
            let skills = self.queues.skill_ratings(mode)?;
            queues.push(QueueStats {
                mode,
                waiting: skills.len(),
                estimate: self.estimator.estimate(mode, &skills),
            });
        }

        Ok(SystemStats {
            total_players: self.registry.player_count()?,
            total_matches: self.total_matches(),
            started_at: self.started_at,
            uptime_seconds: now.signed_duration_since(self.started_at).num_seconds(),
            queues,
            average_skill_difference: self.history.average_skill_difference()?,
            recent_matches: self.history.len()?.min(STATS_RECENT_MATCHES),
        })
    }
}
