//! Waiting queues for the matchmaking engine
//!
//! One FIFO list per game mode, with order-preserving removal of arbitrary
//! members.

pub mod list;
pub mod manager;

// Re-export commonly used types
pub use list::{ModeQueue, QueuedPlayer};
pub use manager::{QueueManager, TakenPair};
