//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the duel-parlor matchmaking
//! engine using Prometheus metrics. Nothing here serves HTTP; callers gather
//! or encode the registry themselves.

use crate::types::{GameMode, Match};
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge,
    IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the matchmaking engine
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Player registry metrics
    player_metrics: PlayerMetrics,

    /// Queue metrics
    queue_metrics: QueueMetrics,

    /// Match creation and processing metrics
    match_metrics: MatchMetrics,
}

/// Player registry metrics
#[derive(Clone)]
pub struct PlayerMetrics {
    /// Total players registered
    pub players_registered_total: IntCounter,

    /// Registrations rejected as duplicates
    pub duplicate_registrations_total: IntCounter,

    /// Players currently known
    pub players_known: IntGauge,
}

/// Queue metrics
#[derive(Clone)]
pub struct QueueMetrics {
    /// Successful enqueues by mode
    pub queue_joins_total: IntCounterVec,

    /// Rejected enqueues by mode and reason
    pub queue_rejections_total: IntCounterVec,

    /// Players who left a queue without being matched
    pub queue_leaves_total: IntCounterVec,

    /// Players currently waiting by mode
    pub queue_depth: IntGaugeVec,

    /// Time spent waiting before being matched
    pub queue_wait_time_seconds: HistogramVec,
}

/// Match metrics
#[derive(Clone)]
pub struct MatchMetrics {
    /// Matches created by mode and pairing kind
    pub matches_created_total: IntCounterVec,

    /// Matches resolved and recorded in history
    pub matches_processed_total: IntCounterVec,

    /// Skill difference of created matches
    pub match_skill_difference: HistogramVec,

    /// Time spent scanning a queue for a pair
    pub match_search_duration_seconds: HistogramVec,

    /// Outcomes rejected from the simulator
    pub invalid_outcomes_total: IntCounter,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let player_metrics = PlayerMetrics::new(&registry)?;
        let queue_metrics = QueueMetrics::new(&registry)?;
        let match_metrics = MatchMetrics::new(&registry)?;

        Ok(Self {
            registry,
            player_metrics,
            queue_metrics,
            match_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get player metrics
    pub fn player(&self) -> &PlayerMetrics {
        &self.player_metrics
    }

    /// Get queue metrics
    pub fn queue(&self) -> &QueueMetrics {
        &self.queue_metrics
    }

    /// Get match metrics
    pub fn matches(&self) -> &MatchMetrics {
        &self.match_metrics
    }

    /// Render every registered metric in the Prometheus text format
    pub fn encode_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Record a player being registered
    pub fn record_player_registered(&self, known_players: usize) {
        self.player_metrics.players_registered_total.inc();
        self.player_metrics.players_known.set(known_players as i64);
    }

    /// Record a duplicate registration attempt
    pub fn record_duplicate_registration(&self) {
        self.player_metrics.duplicate_registrations_total.inc();
    }

    /// Record a successful enqueue
    pub fn record_queue_join(&self, mode: GameMode, depth: usize) {
        self.queue_metrics
            .queue_joins_total
            .with_label_values(&[mode.as_label()])
            .inc();
        self.set_queue_depth(mode, depth);
    }

    /// Record a rejected enqueue
    pub fn record_queue_rejection(&self, mode: GameMode, reason: &str) {
        self.queue_metrics
            .queue_rejections_total
            .with_label_values(&[mode.as_label(), reason])
            .inc();
    }

    /// Record a player leaving a queue unmatched
    pub fn record_queue_leave(&self, mode: GameMode, depth: usize) {
        self.queue_metrics
            .queue_leaves_total
            .with_label_values(&[mode.as_label()])
            .inc();
        self.set_queue_depth(mode, depth);
    }

    /// Update the waiting-player gauge for a mode
    pub fn set_queue_depth(&self, mode: GameMode, depth: usize) {
        self.queue_metrics
            .queue_depth
            .with_label_values(&[mode.as_label()])
            .set(depth as i64);
    }

    /// Record a match coming out of the engine
    pub fn record_match_created(&self, created: &Match, waits: &[Duration]) {
        let mode = created.mode.as_label();

        self.match_metrics
            .matches_created_total
            .with_label_values(&[mode, created.pairing.as_label()])
            .inc();
        self.match_metrics
            .match_skill_difference
            .with_label_values(&[mode])
            .observe(created.skill_difference as f64);

        for wait in waits {
            self.queue_metrics
                .queue_wait_time_seconds
                .with_label_values(&[mode])
                .observe(wait.as_secs_f64());
        }
    }

    /// Record how long a pair search took
    pub fn record_match_search(&self, mode: GameMode, duration: Duration) {
        self.match_metrics
            .match_search_duration_seconds
            .with_label_values(&[mode.as_label()])
            .observe(duration.as_secs_f64());
    }

    /// Record a match appended to history
    pub fn record_match_processed(&self, mode: GameMode) {
        self.match_metrics
            .matches_processed_total
            .with_label_values(&[mode.as_label()])
            .inc();
    }

    /// Record an outcome naming a non-participant
    pub fn record_invalid_outcome(&self) {
        self.match_metrics.invalid_outcomes_total.inc();
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector").finish_non_exhaustive()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl PlayerMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let players_registered_total = IntCounter::new(
            "duel_parlor_players_registered_total",
            "Total players registered",
        )?;
        registry.register(Box::new(players_registered_total.clone()))?;

        let duplicate_registrations_total = IntCounter::new(
            "duel_parlor_duplicate_registrations_total",
            "Registrations rejected because the username was taken",
        )?;
        registry.register(Box::new(duplicate_registrations_total.clone()))?;

        let players_known = IntGauge::new("duel_parlor_players_known", "Players currently known")?;
        registry.register(Box::new(players_known.clone()))?;

        Ok(Self {
            players_registered_total,
            duplicate_registrations_total,
            players_known,
        })
    }
}

impl QueueMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let queue_joins_total = IntCounterVec::new(
            Opts::new("duel_parlor_queue_joins_total", "Total successful enqueues"),
            &["mode"],
        )?;
        registry.register(Box::new(queue_joins_total.clone()))?;

        let queue_rejections_total = IntCounterVec::new(
            Opts::new(
                "duel_parlor_queue_rejections_total",
                "Total rejected enqueues",
            ),
            &["mode", "reason"],
        )?;
        registry.register(Box::new(queue_rejections_total.clone()))?;

        let queue_leaves_total = IntCounterVec::new(
            Opts::new(
                "duel_parlor_queue_leaves_total",
                "Players who left a queue unmatched",
            ),
            &["mode"],
        )?;
        registry.register(Box::new(queue_leaves_total.clone()))?;

        let queue_depth = IntGaugeVec::new(
            Opts::new("duel_parlor_queue_depth", "Players currently waiting"),
            &["mode"],
        )?;
        registry.register(Box::new(queue_depth.clone()))?;

        let queue_wait_time_seconds = HistogramVec::new(
            HistogramOpts::new(
                "duel_parlor_queue_wait_time_seconds",
                "Time spent waiting before being matched",
            )
            .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
            &["mode"],
        )?;
        registry.register(Box::new(queue_wait_time_seconds.clone()))?;

        Ok(Self {
            queue_joins_total,
            queue_rejections_total,
            queue_leaves_total,
            queue_depth,
            queue_wait_time_seconds,
        })
    }
}

impl MatchMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let matches_created_total = IntCounterVec::new(
            Opts::new("duel_parlor_matches_created_total", "Total matches created"),
            &["mode", "pairing"],
        )?;
        registry.register(Box::new(matches_created_total.clone()))?;

        let matches_processed_total = IntCounterVec::new(
            Opts::new(
                "duel_parlor_matches_processed_total",
                "Total matches resolved and recorded",
            ),
            &["mode"],
        )?;
        registry.register(Box::new(matches_processed_total.clone()))?;

        let match_skill_difference = HistogramVec::new(
            HistogramOpts::new(
                "duel_parlor_match_skill_difference",
                "Skill difference of created matches",
            )
            .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0]),
            &["mode"],
        )?;
        registry.register(Box::new(match_skill_difference.clone()))?;

        let match_search_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "duel_parlor_match_search_duration_seconds",
                "Time spent scanning a queue for a pair",
            )
            .buckets(vec![0.00001, 0.0001, 0.001, 0.01, 0.1]),
            &["mode"],
        )?;
        registry.register(Box::new(match_search_duration_seconds.clone()))?;

        let invalid_outcomes_total = IntCounter::new(
            "duel_parlor_invalid_outcomes_total",
            "Outcomes rejected because the winner was not a participant",
        )?;
        registry.register(Box::new(invalid_outcomes_total.clone()))?;

        Ok(Self {
            matches_created_total,
            matches_processed_total,
            match_skill_difference,
            match_search_duration_seconds,
            invalid_outcomes_total,
        })
    }
}
