//! Concurrency tests for enqueueing and matching
//!
//! These tests hammer a shared engine from many tasks and check that queue
//! membership stays consistent: nobody is matched twice and nobody is lost.

use crate::fixtures::{create_test_engine, ScriptedSimulator};
use duel_parlor::types::GameMode;
use duel_parlor::MatchmakingEngine;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn shared_engine() -> Arc<MatchmakingEngine> {
    Arc::new(create_test_engine(Arc::new(ScriptedSimulator::default())))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enqueues_are_all_recorded() {
    let engine = shared_engine();
    let player_count = 200;

    let tasks = (0..player_count).map(|i| {
        let engine = engine.clone();
        tokio::spawn(async move {
            let username = format!("player-{}", i);
            let mode = GameMode::ALL[i % GameMode::COUNT];
            engine.create_player(&username, (i % 10) as i32, mode)?;
            engine.enqueue(&username, mode).map(|_| ())
        })
    });

    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let total: usize = GameMode::ALL
        .iter()
        .map(|mode| engine.queue_count(*mode).unwrap())
        .sum();
    assert_eq!(total, player_count);
    assert!(engine.list_players().unwrap().iter().all(|p| p.is_queued()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_duplicate_enqueue_admits_one() {
    let engine = shared_engine();
    engine.create_player("racer", 5, GameMode::Casual).unwrap();

    let tasks = (0..32).map(|i| {
        let engine = engine.clone();
        tokio::spawn(async move {
            let mode = GameMode::ALL[i % GameMode::COUNT];
            engine.enqueue("racer", mode).is_ok()
        })
    });

    let admitted = join_all(tasks)
        .await
        .into_iter()
        .filter(|result| *result.as_ref().unwrap())
        .count();
    assert_eq!(admitted, 1);

    let total: usize = GameMode::ALL
        .iter()
        .map(|mode| engine.queue_count(*mode).unwrap())
        .sum();
    assert_eq!(total, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_matchers_never_double_book() {
    let engine = shared_engine();
    let player_count = 120;
    for i in 0..player_count {
        let username = format!("casual-{}", i);
        engine
            .create_player(&username, (i % 7) as i32, GameMode::Casual)
            .unwrap();
        engine.enqueue(&username, GameMode::Casual).unwrap();
    }

    let start = Instant::now();
    let matchers = (0..8).map(|_| {
        let engine = engine.clone();
        tokio::spawn(async move {
            let mut created = Vec::new();
            while let Some(pending) = engine.try_create_match(GameMode::Casual).unwrap() {
                created.push(engine.process_match(pending).unwrap());
                tokio::task::yield_now().await;
            }
            created
        })
    });

    let matches: Vec<_> = join_all(matchers)
        .await
        .into_iter()
        .flat_map(|result| result.unwrap())
        .collect();
    let elapsed = start.elapsed();

    assert_eq!(matches.len(), player_count / 2);
    assert_eq!(engine.queue_count(GameMode::Casual).unwrap(), 0);

    let mut seen = HashSet::new();
    for m in &matches {
        assert!(seen.insert(m.player1.id), "{} matched twice", m.player1.username);
        assert!(seen.insert(m.player2.id), "{} matched twice", m.player2.username);
    }
    assert_eq!(seen.len(), player_count);
    assert_eq!(engine.total_matches(), (player_count / 2) as u64);
    assert!(elapsed < Duration::from_secs(5));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_enqueue_and_match_interleaved() {
    let engine = shared_engine();
    let player_count = 100;
    for i in 0..player_count {
        engine
            .create_player(&format!("ranked-{}", i), 10, GameMode::Ranked)
            .unwrap();
    }

    let producer = {
        let engine = engine.clone();
        tokio::spawn(async move {
            for i in 0..player_count {
                engine
                    .enqueue(&format!("ranked-{}", i), GameMode::Ranked)
                    .unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let consumer = {
        let engine = engine.clone();
        tokio::spawn(async move {
            let mut matched = 0;
            let deadline = Instant::now() + Duration::from_secs(5);
            while matched < player_count / 2 && Instant::now() < deadline {
                match engine.try_create_match(GameMode::Ranked).unwrap() {
                    Some(_) => matched += 1,
                    None => tokio::task::yield_now().await,
                }
            }
            matched
        })
    };

    producer.await.unwrap();
    let matched = consumer.await.unwrap();

    assert_eq!(matched, player_count / 2);
    assert_eq!(engine.queue_count(GameMode::Ranked).unwrap(), 0);
    assert!(engine.list_players().unwrap().iter().all(|p| !p.is_queued()));
}
