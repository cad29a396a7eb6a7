//! Common types used throughout the matchmaking engine

use crate::error::MatchmakingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = Uuid;

/// Unique identifier for matches
pub type MatchId = Uuid;

/// Matchmaking category. Each mode owns one waiting queue and one pairing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameMode {
    Casual,
    Ranked,
    QuickPlay,
}

impl GameMode {
    /// Every mode, in display order
    pub const ALL: [GameMode; 3] = [GameMode::Casual, GameMode::Ranked, GameMode::QuickPlay];

    /// Number of modes
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index used by per-mode tables
    pub fn index(self) -> usize {
        match self {
            GameMode::Casual => 0,
            GameMode::Ranked => 1,
            GameMode::QuickPlay => 2,
        }
    }

    /// Lowercase label used for metrics and logs
    pub fn as_label(self) -> &'static str {
        match self {
            GameMode::Casual => "casual",
            GameMode::Ranked => "ranked",
            GameMode::QuickPlay => "quickplay",
        }
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameMode::Casual => write!(f, "Casual"),
            GameMode::Ranked => write!(f, "Ranked"),
            GameMode::QuickPlay => write!(f, "QuickPlay"),
        }
    }
}

impl FromStr for GameMode {
    type Err = MatchmakingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "casual" => Ok(GameMode::Casual),
            "ranked" => Ok(GameMode::Ranked),
            "quickplay" => Ok(GameMode::QuickPlay),
            _ => Err(MatchmakingError::UnrecognizedMode {
                value: value.to_string(),
            }),
        }
    }
}

/// A player's current place in a waiting queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMembership {
    pub mode: GameMode,
    pub joined_at: DateTime<Utc>,
    /// Issued per enqueue; lets stale removals leave newer memberships alone
    pub ticket: u64,
}

/// Cumulative win/loss record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub wins: u32,
    pub losses: u32,
}

impl PlayerRecord {
    pub fn games_played(&self) -> u32 {
        self.wins + self.losses
    }

    /// Fraction of games won, 0.0 when no games have been played
    pub fn win_rate(&self) -> f64 {
        match self.games_played() {
            0 => 0.0,
            played => self.wins as f64 / played as f64,
        }
    }
}

/// Player information for matchmaking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub skill_rating: i32,
    pub preferred_mode: GameMode,
    pub queue: Option<QueueMembership>,
    pub record: PlayerRecord,
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn is_queued(&self) -> bool {
        self.queue.is_some()
    }

    pub fn queued_mode(&self) -> Option<GameMode> {
        self.queue.as_ref().map(|membership| membership.mode)
    }

    pub fn joined_queue_at(&self) -> Option<DateTime<Utc>> {
        self.queue.as_ref().map(|membership| membership.joined_at)
    }

    /// How long the player has been waiting as of `now`, if queued
    pub fn queue_wait(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.joined_queue_at()
            .map(|joined_at| now.signed_duration_since(joined_at))
    }
}

/// How the engine arrived at a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairingKind {
    /// Two front-most players, no compatibility check
    FirstInLine,
    /// First pair in scan order inside the skill window
    SkillWindow,
    /// Front-most pair forced because the queue grew too long
    Overflow,
}

impl PairingKind {
    pub fn as_label(self) -> &'static str {
        match self {
            PairingKind::FirstInLine => "first_in_line",
            PairingKind::SkillWindow => "skill_window",
            PairingKind::Overflow => "overflow",
        }
    }
}

/// A 1v1 pairing produced by the match engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub mode: GameMode,
    pub player1: Player,
    pub player2: Player,
    pub skill_difference: u32,
    pub pairing: PairingKind,
    pub created_at: DateTime<Utc>,
    /// Unset until the outcome collaborator resolves the match
    pub winner: Option<PlayerId>,
}

impl Match {
    pub fn new(player1: Player, player2: Player, mode: GameMode, pairing: PairingKind) -> Self {
        let skill_difference =
            crate::utils::skill_difference(player1.skill_rating, player2.skill_rating);
        Self {
            id: crate::utils::generate_match_id(),
            mode,
            player1,
            player2,
            skill_difference,
            pairing,
            created_at: crate::utils::current_timestamp(),
            winner: None,
        }
    }

    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.player1.id == player_id || self.player2.id == player_id
    }

    pub fn opponent_of(&self, player_id: PlayerId) -> Option<&Player> {
        if self.player1.id == player_id {
            Some(&self.player2)
        } else if self.player2.id == player_id {
            Some(&self.player1)
        } else {
            None
        }
    }

    pub fn is_processed(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner_player(&self) -> Option<&Player> {
        let winner = self.winner?;
        [&self.player1, &self.player2]
            .into_iter()
            .find(|player| player.id == winner)
    }

    pub fn loser_player(&self) -> Option<&Player> {
        let winner = self.winner?;
        self.opponent_of(winner)
    }
}

impl std::fmt::Display for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} match: {} (S{}) vs {} (S{})",
            self.mode,
            self.player1.username,
            self.player1.skill_rating,
            self.player2.username,
            self.player2.skill_rating
        )?;
        match self.winner_player() {
            Some(winner) => write!(f, " - winner: {}", winner.username),
            None => write!(f, " - pending"),
        }
    }
}
