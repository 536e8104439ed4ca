//! Leaderboard store interface and implementations
//!
//! The store owns leaderboards, rosters, match logs and editors. It knows
//! nothing about ratings; readers take a [`LeaderboardSnapshot`] and hand it
//! to the rating engine.

pub mod memory;
pub mod snapshot;

pub use memory::InMemoryLeaderboardStore;
pub use snapshot::{LeaderboardDocument, SnapshotDocument};

use crate::error::Result;
use crate::types::{Editor, Leaderboard, LeaderboardId, Match, MatchId, Player, PlayerId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Everything needed to rank one leaderboard at a given store version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardSnapshot {
    pub leaderboard: Leaderboard,
    pub players: Vec<Player>,
    pub matches: Vec<Match>,
    pub editors: Vec<Editor>,
    pub version: u64,
}

/// Trait for leaderboard record storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    /// Create a new empty leaderboard
    async fn create_leaderboard(&self, name: &str) -> Result<Leaderboard>;

    /// Get all leaderboards
    async fn list_leaderboards(&self) -> Result<Vec<Leaderboard>>;

    /// Delete a leaderboard with its roster, match log and editors
    async fn delete_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<bool>;

    /// Register a player on a leaderboard
    async fn add_player(&self, leaderboard_id: LeaderboardId, name: &str) -> Result<Player>;

    /// Remove a player from its roster; recorded matches keep the id
    async fn remove_player(&self, player_id: PlayerId) -> Result<bool>;

    /// Record a match result, stamped with the current time
    async fn record_match(
        &self,
        leaderboard_id: LeaderboardId,
        winners: Vec<PlayerId>,
        losers: Vec<PlayerId>,
    ) -> Result<Match>;

    /// Remove a recorded match
    async fn remove_match(&self, match_id: MatchId) -> Result<bool>;

    /// Allow an email to edit a leaderboard
    async fn add_editor(&self, leaderboard_id: LeaderboardId, email: &str) -> Result<Editor>;

    /// Revoke an editor from one leaderboard
    async fn remove_editor(&self, leaderboard_id: LeaderboardId, email: &str) -> Result<bool>;

    /// Get editors of a leaderboard
    async fn editors(&self, leaderboard_id: LeaderboardId) -> Result<Vec<Editor>>;

    /// Read roster and match log of a leaderboard in one consistent view
    async fn snapshot(&self, leaderboard_id: LeaderboardId) -> Result<LeaderboardSnapshot>;

    /// Counter bumped by every successful mutation
    async fn version(&self) -> Result<u64>;
}
