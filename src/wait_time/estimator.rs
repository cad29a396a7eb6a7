//! Wait estimation from queue population and skill spread

use crate::config::EstimatorSettings;
use crate::types::GameMode;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coarse estimate of how long a newcomer would wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaitEstimate {
    NoWait,
    ShortWait,
    LongWait,
}

impl std::fmt::Display for WaitEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitEstimate::NoWait => write!(f, "No wait"),
            WaitEstimate::ShortWait => write!(f, "Short wait"),
            WaitEstimate::LongWait => write!(f, "Long wait"),
        }
    }
}

/// Maps a mode's waiting skill ratings to a [`WaitEstimate`]
#[derive(Debug, Clone, Default)]
pub struct WaitEstimator {
    settings: EstimatorSettings,
}

impl WaitEstimator {
    pub fn new(settings: EstimatorSettings) -> Self {
        Self { settings }
    }

    /// Estimate the wait in `mode` given the skills of everyone waiting there
    pub fn estimate(&self, mode: GameMode, waiting_skills: &[i32]) -> WaitEstimate {
        let estimate = match waiting_skills.len() {
            0 => WaitEstimate::LongWait,
            1 => WaitEstimate::ShortWait,
            population => match mode {
                GameMode::Casual => WaitEstimate::NoWait,
                GameMode::Ranked => self.ranked_estimate(waiting_skills),
                GameMode::QuickPlay => {
                    if population >= self.settings.quick_play_no_wait_population {
                        WaitEstimate::NoWait
                    } else {
                        WaitEstimate::ShortWait
                    }
                }
            },
        };

        debug!(
            "{} wait estimate with {} waiting: {}",
            mode,
            waiting_skills.len(),
            estimate
        );
        estimate
    }

    fn ranked_estimate(&self, waiting_skills: &[i32]) -> WaitEstimate {
        let spread = match (waiting_skills.iter().min(), waiting_skills.iter().max()) {
            (Some(min), Some(max)) => min.abs_diff(*max),
            _ => return WaitEstimate::LongWait,
        };

        if spread <= self.settings.ranked_no_wait_spread {
            WaitEstimate::NoWait
        } else if spread <= self.settings.ranked_short_wait_spread {
            WaitEstimate::ShortWait
        } else {
            WaitEstimate::LongWait
        }
    }
}
