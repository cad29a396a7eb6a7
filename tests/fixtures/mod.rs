//! Test fixtures and scripted collaborators for integration testing

use duel_parlor::config::AppConfig;
use duel_parlor::types::{GameMode, Match, PlayerId};
use duel_parlor::{MatchmakingEngine, OutcomeSimulator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Who a scripted outcome favours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    PlayerOne,
    PlayerTwo,
    /// A player id that belongs to neither participant
    Outsider,
}

/// Outcome simulator that plays back a fixed script of verdicts.
///
/// Once the script runs out every further match goes to player one.
#[derive(Debug, Default)]
pub struct ScriptedSimulator {
    script: Mutex<Vec<Verdict>>,
    calls: AtomicUsize,
}

impl ScriptedSimulator {
    pub fn new(mut script: Vec<Verdict>) -> Self {
        script.reverse();
        Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times the engine asked for an outcome
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OutcomeSimulator for ScriptedSimulator {
    fn simulate(&self, pending: &Match) -> PlayerId {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let verdict = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop())
            .unwrap_or(Verdict::PlayerOne);

        match verdict {
            Verdict::PlayerOne => pending.player1.id,
            Verdict::PlayerTwo => pending.player2.id,
            Verdict::Outsider => duel_parlor::utils::generate_player_id(),
        }
    }
}

/// Engine with default configuration and the given simulator
pub fn create_test_engine(simulator: Arc<ScriptedSimulator>) -> MatchmakingEngine {
    MatchmakingEngine::new(AppConfig::default(), simulator).unwrap()
}

/// Register and queue `players` in `mode`, in order
pub fn queue_players(engine: &MatchmakingEngine, mode: GameMode, players: &[(&str, i32)]) {
    for (username, skill) in players {
        engine.create_player(username, *skill, mode).unwrap();
        engine.enqueue(username, mode).unwrap();
    }
}

/// Usernames waiting in `mode`, front first
pub fn waiting(engine: &MatchmakingEngine, mode: GameMode) -> Vec<String> {
    engine
        .queue_snapshot(mode)
        .unwrap()
        .into_iter()
        .map(|player| player.username)
        .collect()
}
