//! Match creation
//!
//! The match engine asks the mode's strategy for a pair, removes it from the
//! queue under the queue lock, then clears both players' membership in the
//! registry once the queue lock has been released.

use crate::error::Result;
use crate::matching::strategy::StrategyTable;
use crate::metrics::MetricsCollector;
use crate::player::PlayerRegistry;
use crate::queue::{QueueManager, QueuedPlayer};
use crate::types::{GameMode, Match};
use crate::utils::current_timestamp;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Turns waiting players into matches
#[derive(Debug)]
pub struct MatchEngine {
    queues: Arc<QueueManager>,
    registry: Arc<PlayerRegistry>,
    strategies: StrategyTable,
    metrics: Arc<MetricsCollector>,
}

impl MatchEngine {
    pub fn new(
        queues: Arc<QueueManager>,
        registry: Arc<PlayerRegistry>,
        strategies: StrategyTable,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            queues,
            registry,
            strategies,
            metrics,
        }
    }

    /// Try to form one match in `mode`.
    ///
    /// Returns `Ok(None)` immediately when fewer than two players wait or the
    /// mode's rule finds no acceptable pair. On success both players are gone
    /// from the queue and no longer marked as queued.
    pub fn try_create_match(&self, mode: GameMode) -> Result<Option<Match>> {
        let strategy = self.strategies.for_mode(mode);

        let timer = self.metrics.start_timer();
        let taken = self.queues.take_pair(mode, strategy)?;
        self.metrics.record_match_search(mode, timer.stop());

        let Some(taken) = taken else {
            return Ok(None);
        };

        let now = current_timestamp();
        let waits: Vec<std::time::Duration> = [&taken.first, &taken.second]
            .iter()
            .filter_map(|entry| now.signed_duration_since(entry.joined_at).to_std().ok())
            .collect();

        let player1 = match self
            .registry
            .end_queue(&taken.first.username, taken.first.ticket)
        {
            Ok(player) => player,
            Err(err) => {
                self.restore(mode, [taken.first, taken.second]);
                return Err(err);
            }
        };
        let player2 = match self
            .registry
            .end_queue(&taken.second.username, taken.second.ticket)
        {
            Ok(player) => player,
            Err(err) => {
                error!(
                    "'{}' left the {} queue without a match",
                    player1.username, mode
                );
                self.restore(mode, [taken.second]);
                return Err(err);
            }
        };

        let created = Match::new(player1, player2, mode, taken.pairing);

        info!(
            "Created {} match {} via {}: {} vs {} (skill difference {})",
            mode,
            created.id,
            strategy.name(),
            created.player1.username,
            created.player2.username,
            created.skill_difference
        );

        self.metrics.record_match_created(&created, &waits);
        let depth = self.queues.count(mode)?;
        self.metrics.set_queue_depth(mode, depth);
        debug!("{} players still waiting in {}", depth, mode);

        Ok(Some(created))
    }

    /// Put still-queued players back at the tail after a failed match
    fn restore<const N: usize>(&self, mode: GameMode, entries: [QueuedPlayer; N]) {
        for entry in entries {
            let username = entry.username.clone();
            match self.queues.enqueue(mode, entry) {
                Ok(position) => warn!(
                    "Returned '{}' to the {} queue at position {}",
                    username, mode, position
                ),
                Err(err) => error!(
                    "Dropped '{}' from the {} queue: {}",
                    username, mode, err
                ),
            }
        }
    }
}
