//! Pairing behaviour of each game mode, observed through the engine

use crate::fixtures::{create_test_engine, queue_players, waiting, ScriptedSimulator};
use duel_parlor::types::{GameMode, PairingKind};
use duel_parlor::WaitEstimate;
use std::sync::Arc;

fn engine() -> duel_parlor::MatchmakingEngine {
    create_test_engine(Arc::new(ScriptedSimulator::default()))
}

#[tokio::test]
async fn test_casual_is_first_in_line() {
    let engine = engine();
    queue_players(
        &engine,
        GameMode::Casual,
        &[("A", 1), ("B", 9), ("C", 4), ("D", 7)],
    );

    let created = engine.try_create_match(GameMode::Casual).unwrap().unwrap();
    assert_eq!(created.player1.username, "A");
    assert_eq!(created.player2.username, "B");
    assert_eq!(created.pairing, PairingKind::FirstInLine);
    assert_eq!(waiting(&engine, GameMode::Casual), vec!["C", "D"]);
}

#[tokio::test]
async fn test_ranked_tie_break_is_lexicographic() {
    let engine = engine();
    queue_players(
        &engine,
        GameMode::Ranked,
        &[("A", 10), ("B", 11), ("C", 20), ("D", 12)],
    );

    let created = engine.try_create_match(GameMode::Ranked).unwrap().unwrap();
    assert_eq!(created.player1.username, "A");
    assert_eq!(created.player2.username, "B");
    assert_eq!(created.skill_difference, 1);
    assert_eq!(waiting(&engine, GameMode::Ranked), vec!["C", "D"]);
}

#[tokio::test]
async fn test_ranked_match_from_middle_preserves_survivor_order() {
    let engine = engine();
    queue_players(
        &engine,
        GameMode::Ranked,
        &[("A", 1), ("B", 10), ("C", 12), ("D", 30)],
    );

    let created = engine.try_create_match(GameMode::Ranked).unwrap().unwrap();
    assert_eq!(
        (created.player1.username.as_str(), created.player2.username.as_str()),
        ("B", "C")
    );
    assert_eq!(waiting(&engine, GameMode::Ranked), vec!["A", "D"]);
}

#[tokio::test]
async fn test_ranked_without_compatible_pair() {
    let engine = engine();
    queue_players(&engine, GameMode::Ranked, &[("A", 1), ("B", 4), ("C", 7)]);

    assert!(engine.try_create_match(GameMode::Ranked).unwrap().is_none());
    assert_eq!(waiting(&engine, GameMode::Ranked), vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_quick_play_overflow_after_four_waiting() {
    let engine = engine();
    queue_players(
        &engine,
        GameMode::QuickPlay,
        &[("A", 1), ("B", 10), ("C", 20), ("D", 30), ("E", 40)],
    );

    let created = engine
        .try_create_match(GameMode::QuickPlay)
        .unwrap()
        .unwrap();
    assert_eq!(created.player1.username, "A");
    assert_eq!(created.player2.username, "B");
    assert_eq!(created.pairing, PairingKind::Overflow);
    assert_eq!(waiting(&engine, GameMode::QuickPlay), vec!["C", "D", "E"]);

    // Three incompatible players left: below the overflow threshold
    assert!(engine
        .try_create_match(GameMode::QuickPlay)
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_quick_play_prefers_skill_window() {
    let engine = engine();
    queue_players(
        &engine,
        GameMode::QuickPlay,
        &[("A", 1), ("B", 10), ("C", 20), ("D", 30), ("E", 21)],
    );

    let created = engine
        .try_create_match(GameMode::QuickPlay)
        .unwrap()
        .unwrap();
    assert_eq!(created.player1.username, "C");
    assert_eq!(created.player2.username, "E");
    assert_eq!(created.pairing, PairingKind::SkillWindow);
}

#[tokio::test]
async fn test_insufficient_population_in_every_mode() {
    let engine = engine();
    for mode in GameMode::ALL {
        assert!(engine.try_create_match(mode).unwrap().is_none());
    }

    queue_players(&engine, GameMode::Casual, &[("c", 1)]);
    queue_players(&engine, GameMode::Ranked, &[("r", 1)]);
    queue_players(&engine, GameMode::QuickPlay, &[("q", 1)]);
    for mode in GameMode::ALL {
        assert!(engine.try_create_match(mode).unwrap().is_none());
        assert_eq!(engine.queue_count(mode).unwrap(), 1);
    }
}

#[tokio::test]
async fn test_wait_estimates() {
    let engine = engine();
    assert_eq!(
        engine.estimate_wait(GameMode::Ranked).unwrap(),
        WaitEstimate::LongWait
    );

    queue_players(&engine, GameMode::Ranked, &[("A", 10)]);
    assert_eq!(
        engine.estimate_wait(GameMode::Ranked).unwrap(),
        WaitEstimate::ShortWait
    );

    queue_players(&engine, GameMode::Ranked, &[("B", 11)]);
    assert_eq!(
        engine.estimate_wait(GameMode::Ranked).unwrap(),
        WaitEstimate::NoWait
    );

    queue_players(&engine, GameMode::Ranked, &[("C", 14)]);
    assert_eq!(
        engine.estimate_wait(GameMode::Ranked).unwrap(),
        WaitEstimate::ShortWait
    );

    queue_players(&engine, GameMode::Ranked, &[("D", 20)]);
    assert_eq!(
        engine.estimate_wait(GameMode::Ranked).unwrap(),
        WaitEstimate::LongWait
    );

    queue_players(&engine, GameMode::Casual, &[("x", 1), ("y", 99)]);
    assert_eq!(
        engine.estimate_wait(GameMode::Casual).unwrap(),
        WaitEstimate::NoWait
    );
}
