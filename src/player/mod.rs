//! Player registry for the matchmaking engine
//!
//! This module owns the set of known players and enforces unique,
//! case-insensitive usernames.

pub mod registry;

pub use registry::PlayerRegistry;
