//! Demo driver for the Duel Parlor matchmaking engine
//!
//! Seeds a synthetic roster, queues everyone in their preferred mode and then
//! polls every mode on a fixed tick, resolving matches with a coin flip and
//! sending the players straight back into the queue.

use anyhow::Result;
use clap::Parser;
use duel_parlor::config::{validate_config, AppConfig};
use duel_parlor::{CoinFlipSimulator, GameMode, MatchmakingEngine};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

/// Duel Parlor - in-memory 1v1 matchmaking demo
#[derive(Parser)]
#[command(
    name = "duel-parlor",
    version,
    about = "Runs a synthetic 1v1 matchmaking session",
    long_about = "Duel Parlor registers a synthetic roster of players, queues them in Casual, \
                 Ranked and QuickPlay, and repeatedly pairs them using first-in-line, \
                 skill-window and overflow rules before printing engine statistics."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without running")]
    dry_run: bool,

    /// Number of synthetic players
    #[arg(long, default_value_t = 12, value_name = "COUNT")]
    players: usize,

    /// Number of matching rounds
    #[arg(long, default_value_t = 10, value_name = "COUNT")]
    rounds: u32,

    /// Delay between rounds
    #[arg(long, default_value_t = 250, value_name = "MILLIS")]
    tick_ms: u64,

    /// Seed for the roster and outcomes
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Display startup banner with engine information
fn display_startup_banner(config: &AppConfig, args: &Args) {
    info!("🎲 Duel Parlor Matchmaking Engine v{}", duel_parlor::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!(
        "   Ranked window: {}",
        config.matchmaking.ranked_skill_window
    );
    info!(
        "   QuickPlay window: {} (overflow above {} waiting)",
        config.matchmaking.quick_play_skill_window,
        config.matchmaking.quick_play_overflow_threshold
    );
    info!(
        "   Roster: {} players, {} rounds every {}ms",
        args.players, args.rounds, args.tick_ms
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    validate_config(&config)?;
    Ok(config)
}

/// Register `count` players with random skills and queue each in their preferred mode
fn seed_roster(engine: &MatchmakingEngine, count: usize, rng: &mut StdRng) -> Result<()> {
    for index in 0..count {
        let username = format!("player-{:02}", index + 1);
        let skill_rating = rng.gen_range(1..=10);
        let mode = GameMode::ALL[rng.gen_range(0..GameMode::COUNT)];

        engine.create_player(&username, skill_rating, mode)?;
        engine.enqueue(&username, mode)?;
    }

    for mode in GameMode::ALL {
        info!(
            "{} queue: {} waiting, estimate: {}",
            mode,
            engine.queue_count(mode)?,
            engine.estimate_wait(mode)?
        );
    }
    Ok(())
}

/// Drain every available match in one mode, re-queueing the players afterwards
fn run_mode_round(engine: &MatchmakingEngine, mode: GameMode) -> Result<usize> {
    let mut finished = Vec::new();

    while let Some(pending) = engine.try_create_match(mode)? {
        let processed = engine.process_match(pending)?;
        finished.push(processed.player1);
        finished.push(processed.player2);
    }

    let resolved = finished.len() / 2;
    let requeued = engine.requeue_players(&finished);
    if requeued < finished.len() {
        warn!(
            "{} of {} {} players could not be re-queued",
            finished.len() - requeued,
            finished.len(),
            mode
        );
    }

    if resolved == 0 {
        debug!(
            "No {} match this round, estimate: {}",
            mode,
            engine.estimate_wait(mode)?
        );
    }
    Ok(resolved)
}

/// Poll every mode once per tick, one task per mode
async fn run_rounds(engine: Arc<MatchmakingEngine>, rounds: u32, tick: Duration) -> Result<()> {
    let mut interval = tokio::time::interval(tick);

    for round in 1..=rounds {
        interval.tick().await;

        let handles: Vec<_> = GameMode::ALL
            .into_iter()
            .map(|mode| {
                let engine = engine.clone();
                tokio::spawn(async move { (mode, run_mode_round(&engine, mode)) })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            let (mode, outcome) = handle.await?;
            match outcome {
                Ok(count) => created += count,
                Err(e) => warn!("{} round failed: {}", mode, e),
            }
        }

        info!(
            "Round {}/{}: {} matches, {} processed in total",
            round,
            rounds,
            created,
            engine.total_matches()
        );
    }
    Ok(())
}

/// Print the final statistics and a short history for the first player
fn report(engine: &MatchmakingEngine) -> Result<()> {
    let stats = engine.stats()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    if let Some(first) = engine.list_players()?.first() {
        println!(
            "{}: {} wins, {} losses ({:.0}% win rate)",
            first.username,
            first.record.wins,
            first.record.losses,
            first.record.win_rate() * 100.0
        );
        for recent in engine.player_history(&first.username)? {
            println!("  {}", recent);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config, &args);
        info!("Dry run completed - exiting without running");
        return Ok(());
    }

    display_startup_banner(&config, &args);

    let (mut rng, simulator) = match args.seed {
        Some(seed) => (
            StdRng::seed_from_u64(seed),
            CoinFlipSimulator::seeded(seed.wrapping_add(1)),
        ),
        None => (StdRng::from_entropy(), CoinFlipSimulator::from_entropy()),
    };

    let engine = match MatchmakingEngine::new(config, Arc::new(simulator)) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            error!("Failed to initialize engine: {}", e);
            std::process::exit(1);
        }
    };

    seed_roster(&engine, args.players, &mut rng)?;

    let tick = Duration::from_millis(args.tick_ms.max(1));
    tokio::select! {
        outcome = run_rounds(engine.clone(), args.rounds, tick) => outcome?,
        _ = signal::ctrl_c() => {
            info!("Received SIGINT (Ctrl+C) signal, stopping early");
        }
    }

    report(&engine)?;
    info!("🛑 Duel Parlor session finished");
    Ok(())
}
