//! Utility functions for the matchmaking engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique player ID
pub fn generate_player_id() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new unique match ID
pub fn generate_match_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Case-insensitive identity key for a username
pub fn identity_key(username: &str) -> String {
    username.to_lowercase()
}

/// Calculate the absolute difference between two skill ratings
pub fn skill_difference(skill1: i32, skill2: i32) -> u32 {
    skill1.abs_diff(skill2)
}

/// Check if two skill ratings are within the given window
pub fn skills_within_window(skill1: i32, skill2: i32, window: u32) -> bool {
    skill_difference(skill1, skill2) <= window
}
