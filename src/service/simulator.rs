//! Match outcome collaborators
//!
//! The engine never decides who wins; it asks an [`OutcomeSimulator`] once per
//! match and validates the answer.

use crate::types::{Match, PlayerId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Decides the winner of a match
#[cfg_attr(test, mockall::automock)]
pub trait OutcomeSimulator: Send + Sync {
    /// Return the id of the winning participant
    fn simulate(&self, pending: &Match) -> PlayerId;
}

/// Fair coin flip between the two participants
#[derive(Debug)]
pub struct CoinFlipSimulator {
    rng: Mutex<StdRng>,
}

impl CoinFlipSimulator {
    /// Seeded simulator, reproducible across runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Simulator seeded from system entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl Default for CoinFlipSimulator {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl OutcomeSimulator for CoinFlipSimulator {
    fn simulate(&self, pending: &Match) -> PlayerId {
        let first_wins = match self.rng.lock() {
            Ok(mut rng) => rng.gen_bool(0.5),
            Err(poisoned) => poisoned.into_inner().gen_bool(0.5),
        };

        if first_wins {
            pending.player1.id
        } else {
            pending.player2.id
        }
    }
}
