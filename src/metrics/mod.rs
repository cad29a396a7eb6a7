//! Metrics for the duel-parlor matchmaking engine
//!
//! This module provides Prometheus metrics collection for registrations,
//! queues and matches.

pub mod collector;

pub use collector::{MatchMetrics, MetricsCollector, MetricsTimer, PlayerMetrics, QueueMetrics};
