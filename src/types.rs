//! Common types used throughout the leaderboard service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for players
pub type PlayerId = i64;

/// Unique identifier for recorded matches
pub type MatchId = i64;

/// Unique identifier for leaderboards
pub type LeaderboardId = i64;

/// A named grouping owning a roster and a match log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub id: LeaderboardId,
    pub name: String,
}

/// Player registered on a leaderboard roster
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A single recorded result with variable team sizes
///
/// `inserted_at` is only used to order the replay. Ids on either side may
/// refer to players that are no longer on the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub winners: Vec<PlayerId>,
    pub losers: Vec<PlayerId>,
    pub inserted_at: DateTime<Utc>,
}

impl Match {
    /// A match missing either side cannot move any rating
    pub fn is_degenerate(&self) -> bool {
        self.winners.is_empty() || self.losers.is_empty()
    }
}

/// Fixed two-versus-two record shape used by older leaderboards
///
/// The second slot on each side may be empty for one-versus-one games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyMatch {
    pub id: MatchId,
    pub winner1: PlayerId,
    #[serde(default)]
    pub winner2: Option<PlayerId>,
    pub loser1: PlayerId,
    #[serde(default)]
    pub loser2: Option<PlayerId>,
    pub inserted_at: DateTime<Utc>,
}

impl From<LegacyMatch> for Match {
    fn from(legacy: LegacyMatch) -> Self {
        let winners = std::iter::once(legacy.winner1)
            .chain(legacy.winner2)
            .collect();
        let losers = std::iter::once(legacy.loser1)
            .chain(legacy.loser2)
            .collect();

        Self {
            id: legacy.id,
            winners,
            losers,
            inserted_at: legacy.inserted_at,
        }
    }
}

/// Match record as it arrives from the store, in either shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchRecord {
    Teams(Match),
    Legacy(LegacyMatch),
}

impl MatchRecord {
    /// Normalize into the winners/losers list shape
    pub fn into_match(self) -> Match {
        match self {
            MatchRecord::Teams(m) => m,
            MatchRecord::Legacy(legacy) => legacy.into(),
        }
    }
}

impl From<Match> for MatchRecord {
    fn from(m: Match) -> Self {
        MatchRecord::Teams(m)
    }
}

/// Someone allowed to edit a leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editor {
    pub email: String,
    pub leaderboard: LeaderboardId,
}
