//! Pairing strategies, one per matchmaking rule
//!
//! A strategy looks at a mode's waiting players in queue order and names the
//! pair to match, if any. Strategies never mutate the queue; the queue manager
//! removes the chosen pair while it still holds the mode's lock.

use crate::config::MatchmakingSettings;
use crate::queue::QueuedPlayer;
use crate::types::{GameMode, PairingKind};
use crate::utils::skills_within_window;
use std::fmt::Debug;
use std::sync::Arc;

/// Indices into the waiting slice chosen by a strategy, `first < second`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSelection {
    pub first: usize,
    pub second: usize,
    pub pairing: PairingKind,
}

impl PairSelection {
    pub fn new(first: usize, second: usize, pairing: PairingKind) -> Self {
        Self {
            first,
            second,
            pairing,
        }
    }
}

/// Trait for pairing rules
pub trait MatchStrategy: Send + Sync + Debug {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Pick a pair from `waiting` (front of the queue at index 0)
    fn select_pair(&self, waiting: &[&QueuedPlayer]) -> Option<PairSelection>;
}

/// First pair (i, j), i < j, in lexicographic order whose skills fit `window`
fn first_pair_within(waiting: &[&QueuedPlayer], window: u32) -> Option<(usize, usize)> {
    for i in 0..waiting.len() {
        for j in (i + 1)..waiting.len() {
            if skills_within_window(waiting[i].skill_rating, waiting[j].skill_rating, window) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Strict FIFO: the two front-most players, no compatibility check
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstInLineStrategy;

impl MatchStrategy for FirstInLineStrategy {
    fn name(&self) -> &'static str {
        "first-in-line"
    }

    fn select_pair(&self, waiting: &[&QueuedPlayer]) -> Option<PairSelection> {
        (waiting.len() >= 2).then(|| PairSelection::new(0, 1, PairingKind::FirstInLine))
    }
}

/// First pair in scan order whose skill difference is at most `window`
#[derive(Debug, Clone, Copy)]
pub struct SkillWindowStrategy {
    window: u32,
}

impl SkillWindowStrategy {
    pub fn new(window: u32) -> Self {
        Self { window }
    }

    pub fn window(&self) -> u32 {
        self.window
    }
}

impl MatchStrategy for SkillWindowStrategy {
    fn name(&self) -> &'static str {
        "skill-window"
    }

    fn select_pair(&self, waiting: &[&QueuedPlayer]) -> Option<PairSelection> {
        first_pair_within(waiting, self.window)
            .map(|(i, j)| PairSelection::new(i, j, PairingKind::SkillWindow))
    }
}

/// Skill-window scan first; once more than `overflow_threshold` players wait
/// without a compatible pair, the two front-most are matched anyway.
#[derive(Debug, Clone, Copy)]
pub struct OverflowStrategy {
    window: u32,
    overflow_threshold: usize,
}

impl OverflowStrategy {
    pub fn new(window: u32, overflow_threshold: usize) -> Self {
        Self {
            window,
            overflow_threshold,
        }
    }
}

impl MatchStrategy for OverflowStrategy {
    fn name(&self) -> &'static str {
        "skill-window-with-overflow"
    }

    fn select_pair(&self, waiting: &[&QueuedPlayer]) -> Option<PairSelection> {
        if let Some((i, j)) = first_pair_within(waiting, self.window) {
            return Some(PairSelection::new(i, j, PairingKind::SkillWindow));
        }

        (waiting.len() > self.overflow_threshold)
            .then(|| PairSelection::new(0, 1, PairingKind::Overflow))
    }
}

/// Dispatch table from mode to pairing rule
#[derive(Debug, Clone)]
pub struct StrategyTable {
    strategies: [Arc<dyn MatchStrategy>; GameMode::COUNT],
}

impl StrategyTable {
    /// Casual → FIFO, Ranked → skill window, QuickPlay → skill window with overflow
    pub fn from_settings(settings: &MatchmakingSettings) -> Self {
        let strategies = std::array::from_fn(|slot| -> Arc<dyn MatchStrategy> {
            match GameMode::ALL[slot] {
                GameMode::Casual => Arc::new(FirstInLineStrategy),
                GameMode::Ranked => {
                    Arc::new(SkillWindowStrategy::new(settings.ranked_skill_window))
                }
                GameMode::QuickPlay => Arc::new(OverflowStrategy::new(
                    settings.quick_play_skill_window,
                    settings.quick_play_overflow_threshold,
                )),
            }
        });

        Self { strategies }
    }

    /// Replace the rule used for one mode
    pub fn with_strategy(mut self, mode: GameMode, strategy: Arc<dyn MatchStrategy>) -> Self {
        self.strategies[mode.index()] = strategy;
        self
    }

    pub fn for_mode(&self, mode: GameMode) -> &dyn MatchStrategy {
        self.strategies[mode.index()].as_ref()
    }
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self::from_settings(&MatchmakingSettings::default())
    }
}
