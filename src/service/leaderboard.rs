//! Leaderboard service tying the store to the rating engine
//!
//! Every read pulls a fresh snapshot and replays it. Nothing about ratings
//! is cached between calls; callers that want to avoid recomputation pass
//! the store version they last rendered.

use crate::error::Result;
use crate::rating::compute;
use crate::store::LeaderboardStore;
use crate::types::{Editor, Leaderboard, LeaderboardId, Match, MatchId, Player, PlayerId};
use crate::view::LeaderboardView;
use std::sync::Arc;
use tracing::{debug, info};

/// Front door for leaderboard reads and mutations
#[derive(Clone)]
pub struct LeaderboardService {
    store: Arc<dyn LeaderboardStore>,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn LeaderboardStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn LeaderboardStore> {
        self.store.clone()
    }

    /// Rank a leaderboard from its current snapshot
    pub async fn view(&self, leaderboard_id: LeaderboardId) -> Result<LeaderboardView> {
        let snapshot = self.store.snapshot(leaderboard_id).await?;
        let standings = compute(&snapshot.players, &snapshot.matches);

        debug!(
            "Computed standings for leaderboard {} at version {}",
            leaderboard_id, snapshot.version
        );
        Ok(LeaderboardView::build(&snapshot, &standings))
    }

    /// Rank a leaderboard unless the store is still at `seen_version`
    pub async fn view_if_changed(
        &self,
        leaderboard_id: LeaderboardId,
        seen_version: Option<u64>,
    ) -> Result<Option<LeaderboardView>> {
        if let Some(seen) = seen_version {
            if self.store.version().await? == seen {
                return Ok(None);
            }
        }
        self.view(leaderboard_id).await.map(Some)
    }

    pub async fn leaderboards(&self) -> Result<Vec<Leaderboard>> {
        self.store.list_leaderboards().await
    }

    pub async fn create_leaderboard(&self, name: &str) -> Result<Leaderboard> {
        let leaderboard = self.store.create_leaderboard(name).await?;
        info!("Created leaderboard {} ({})", leaderboard.id, leaderboard.name);
        Ok(leaderboard)
    }

    pub async fn delete_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<bool> {
        let deleted = self.store.delete_leaderboard(leaderboard_id).await?;
        if deleted {
            info!("Deleted leaderboard {}", leaderboard_id);
        }
        Ok(deleted)
    }

    pub async fn add_player(&self, leaderboard_id: LeaderboardId, name: &str) -> Result<Player> {
        let player = self.store.add_player(leaderboard_id, name).await?;
        info!(
            "Registered {} (#{}) on leaderboard {}",
            player.name, player.id, leaderboard_id
        );
        Ok(player)
    }

    pub async fn remove_player(&self, player_id: PlayerId) -> Result<bool> {
        self.store.remove_player(player_id).await
    }

    pub async fn record_match(
        &self,
        leaderboard_id: LeaderboardId,
        winners: Vec<PlayerId>,
        losers: Vec<PlayerId>,
    ) -> Result<Match> {
        let recorded = self
            .store
            .record_match(leaderboard_id, winners, losers)
            .await?;
        info!(
            "Recorded match {} on leaderboard {}",
            recorded.id, leaderboard_id
        );
        Ok(recorded)
    }

    pub async fn remove_match(&self, match_id: MatchId) -> Result<bool> {
        self.store.remove_match(match_id).await
    }

    pub async fn add_editor(&self, leaderboard_id: LeaderboardId, email: &str) -> Result<Editor> {
        self.store.add_editor(leaderboard_id, email).await
    }

    pub async fn remove_editor(&self, leaderboard_id: LeaderboardId, email: &str) -> Result<bool> {
        self.store.remove_editor(leaderboard_id, email).await
    }
}
