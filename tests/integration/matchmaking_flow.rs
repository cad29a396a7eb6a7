//! End-to-end flows: registration, queueing, processing and reporting

use crate::fixtures::{create_test_engine, queue_players, waiting, ScriptedSimulator, Verdict};
use duel_parlor::types::{GameMode, PlayerRecord};
use duel_parlor::MatchmakingError;
use std::sync::Arc;

fn matchmaking_error(err: anyhow::Error) -> MatchmakingError {
    err.downcast::<MatchmakingError>().unwrap()
}

#[tokio::test]
async fn test_usernames_are_unique_ignoring_case() {
    let engine = create_test_engine(Arc::new(ScriptedSimulator::default()));
    engine.create_player("Alice", 5, GameMode::Casual).unwrap();

    let err = engine
        .create_player("aLICE", 8, GameMode::Ranked)
        .unwrap_err();
    assert!(matches!(
        matchmaking_error(err),
        MatchmakingError::DuplicateIdentity { .. }
    ));

    let players = engine.list_players().unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].skill_rating, 5);
    assert!(!players[0].is_queued());
}

#[tokio::test]
async fn test_player_waits_in_at_most_one_queue() {
    let engine = create_test_engine(Arc::new(ScriptedSimulator::default()));
    queue_players(&engine, GameMode::Casual, &[("alice", 5)]);

    let err = engine.enqueue("alice", GameMode::QuickPlay).unwrap_err();
    assert_eq!(
        matchmaking_error(err),
        MatchmakingError::AlreadyQueued {
            username: "alice".to_string(),
            mode: GameMode::Casual
        }
    );
    assert_eq!(waiting(&engine, GameMode::Casual), vec!["alice"]);
    assert!(waiting(&engine, GameMode::QuickPlay).is_empty());
}

#[tokio::test]
async fn test_full_match_lifecycle() {
    let simulator = Arc::new(ScriptedSimulator::new(vec![Verdict::PlayerTwo]));
    let engine = create_test_engine(simulator.clone());
    queue_players(&engine, GameMode::Ranked, &[("alice", 10), ("bob", 12)]);

    let pending = engine.try_create_match(GameMode::Ranked).unwrap().unwrap();
    assert!(!pending.is_processed());
    assert!(!engine.get_player("alice").unwrap().is_queued());

    let processed = engine.process_match(pending).unwrap();
    assert_eq!(simulator.calls(), 1);
    assert_eq!(processed.winner_player().unwrap().username, "bob");
    assert_eq!(
        engine.get_player("bob").unwrap().record,
        PlayerRecord { wins: 1, losses: 0 }
    );
    assert_eq!(
        engine.get_player("alice").unwrap().record,
        PlayerRecord { wins: 0, losses: 1 }
    );

    let history = engine.match_history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, processed.id);
    assert_eq!(engine.stats().unwrap().total_matches, 1);

    // Matched players can queue again
    engine.enqueue("alice", GameMode::Casual).unwrap();
    engine.enqueue("bob", GameMode::Casual).unwrap();
    assert_eq!(waiting(&engine, GameMode::Casual), vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_outsider_outcome_records_nothing() {
    let simulator = Arc::new(ScriptedSimulator::new(vec![Verdict::Outsider]));
    let engine = create_test_engine(simulator.clone());
    queue_players(&engine, GameMode::Casual, &[("alice", 1), ("bob", 2)]);

    let pending = engine.try_create_match(GameMode::Casual).unwrap().unwrap();
    let err = engine.process_match(pending).unwrap_err();

    assert!(matches!(
        matchmaking_error(err),
        MatchmakingError::InvalidOutcome { .. }
    ));
    assert_eq!(simulator.calls(), 1);
    assert!(engine.match_history().unwrap().is_empty());
    assert_eq!(engine.stats().unwrap().total_matches, 0);
}

#[tokio::test]
async fn test_player_history_is_newest_first_and_limited() {
    let engine = create_test_engine(Arc::new(ScriptedSimulator::default()));
    for (name, skill) in [("alice", 5), ("bob", 5), ("carol", 5)] {
        engine.create_player(name, skill, GameMode::Casual).unwrap();
    }

    let mut processed_ids = Vec::new();
    for opponent in ["bob", "carol", "bob", "carol"] {
        engine.enqueue("alice", GameMode::Casual).unwrap();
        engine.enqueue(opponent, GameMode::Casual).unwrap();
        let pending = engine.try_create_match(GameMode::Casual).unwrap().unwrap();
        processed_ids.push(engine.process_match(pending).unwrap().id);
    }

    let recent: Vec<_> = engine
        .player_history("alice")
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(
        recent,
        vec![processed_ids[3], processed_ids[2], processed_ids[1]]
    );
    assert_eq!(engine.player_history("bob").unwrap().len(), 2);

    let alice = engine.get_player("alice").unwrap();
    assert_eq!(alice.record, PlayerRecord { wins: 4, losses: 0 });
}

#[tokio::test]
async fn test_leave_queue_removes_only_that_player() {
    let engine = create_test_engine(Arc::new(ScriptedSimulator::default()));
    queue_players(
        &engine,
        GameMode::Casual,
        &[("A", 1), ("B", 2), ("C", 3)],
    );

    assert!(engine.leave_queue("b").unwrap());
    assert_eq!(waiting(&engine, GameMode::Casual), vec!["A", "C"]);

    let created = engine.try_create_match(GameMode::Casual).unwrap().unwrap();
    assert_eq!(created.player2.username, "C");
    assert!(!engine.leave_queue("A").unwrap());
}

#[tokio::test]
async fn test_stats_reflect_queues_and_history() {
    let engine = create_test_engine(Arc::new(ScriptedSimulator::default()));
    queue_players(&engine, GameMode::Ranked, &[("A", 10), ("B", 12)]);
    queue_players(&engine, GameMode::QuickPlay, &[("C", 3)]);

    let pending = engine.try_create_match(GameMode::Ranked).unwrap().unwrap();
    engine.process_match(pending).unwrap();

    let stats = engine.stats().unwrap();
    assert_eq!(stats.total_players, 3);
    assert_eq!(stats.total_matches, 1);
    assert_eq!(stats.waiting_in(GameMode::Ranked), 0);
    assert_eq!(stats.waiting_in(GameMode::QuickPlay), 1);
    assert!((stats.average_skill_difference - 2.0).abs() < f64::EPSILON);
    assert_eq!(stats.recent_matches, 1);

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["total_matches"], 1);
}
