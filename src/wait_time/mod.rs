//! Coarse wait estimates per mode
//!
//! Estimates are derived from the current queue population alone; no
//! historical statistics are kept.

pub mod estimator;

// Re-export commonly used types
pub use estimator::{WaitEstimate, WaitEstimator};
