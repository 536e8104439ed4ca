//! Test fixtures and helper implementations for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ladder_board::error::Result;
use ladder_board::store::{InMemoryLeaderboardStore, LeaderboardSnapshot, LeaderboardStore};
use ladder_board::types::{
    Editor, Leaderboard, LeaderboardId, Match, MatchId, Player, PlayerId,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Seeded store contents used across integration tests
pub const OFFICE_SNAPSHOT: &str = r#"{
    "leaderboards": [
        {
            "id": 1,
            "name": "Office foosball",
            "players": [
                {"id": 1, "name": "Ann"},
                {"id": 2, "name": "Bob"},
                {"id": 3, "name": "Cid"},
                {"id": 4, "name": "Dee"}
            ],
            "matches": [
                {"id": 3, "winners": [3, 4], "losers": [1, 2], "inserted_at": "2022-06-03T12:00:00Z"},
                {"id": 1, "winners": [1, 2], "losers": [3, 4], "inserted_at": "2022-06-01T12:00:00Z"},
                {"id": 2, "winner1": 1, "winner2": 3, "loser1": 2, "loser2": 4, "inserted_at": "2022-06-02T12:00:00Z"}
            ],
            "editors": ["ann@example.com"]
        },
        {
            "id": 2,
            "name": "Chess club",
            "players": [{"id": 10, "name": "Eve"}]
        }
    ]
}"#;

/// Timestamp `secs` seconds after a fixed origin
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_650_000_000 + secs, 0).unwrap()
}

pub fn game(id: MatchId, winners: &[PlayerId], losers: &[PlayerId], secs: i64) -> Match {
    Match {
        id,
        winners: winners.to_vec(),
        losers: losers.to_vec(),
        inserted_at: at(secs),
    }
}

/// Players with ids 1..=n named after the given names
pub fn roster(names: &[&str]) -> Vec<Player> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Player::new(i as i64 + 1, *name))
        .collect()
}

pub fn office_store() -> InMemoryLeaderboardStore {
    let document = ladder_board::store::SnapshotDocument::from_json(OFFICE_SNAPSHOT).unwrap();
    InMemoryLeaderboardStore::from_document(document).unwrap()
}

/// Store wrapper that counts snapshot reads
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: InMemoryLeaderboardStore,
    snapshot_calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: InMemoryLeaderboardStore) -> Self {
        Self {
            inner,
            snapshot_calls: AtomicUsize::new(0),
        }
    }

    /// Number of snapshots taken so far
    pub fn snapshot_calls(&self) -> usize {
        self.snapshot_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LeaderboardStore for CountingStore {
    async fn create_leaderboard(&self, name: &str) -> Result<Leaderboard> {
        self.inner.create_leaderboard(name).await
    }

    async fn list_leaderboards(&self) -> Result<Vec<Leaderboard>> {
        self.inner.list_leaderboards().await
    }

    async fn delete_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<bool> {
        self.inner.delete_leaderboard(leaderboard_id).await
    }

    async fn add_player(&self, leaderboard_id: LeaderboardId, name: &str) -> Result<Player> {
        self.inner.add_player(leaderboard_id, name).await
    }

    async fn remove_player(&self, player_id: PlayerId) -> Result<bool> {
        self.inner.remove_player(player_id).await
    }

    async fn record_match(
        &self,
        leaderboard_id: LeaderboardId,
        winners: Vec<PlayerId>,
        losers: Vec<PlayerId>,
    ) -> Result<Match> {
        self.inner.record_match(leaderboard_id, winners, losers).await
    }

    async fn remove_match(&self, match_id: MatchId) -> Result<bool> {
        self.inner.remove_match(match_id).await
    }

    async fn add_editor(&self, leaderboard_id: LeaderboardId, email: &str) -> Result<Editor> {
        self.inner.add_editor(leaderboard_id, email).await
    }

    async fn remove_editor(&self, leaderboard_id: LeaderboardId, email: &str) -> Result<bool> {
        self.inner.remove_editor(leaderboard_id, email).await
    }

    async fn editors(&self, leaderboard_id: LeaderboardId) -> Result<Vec<Editor>> {
        self.inner.editors(leaderboard_id).await
    }

    async fn snapshot(&self, leaderboard_id: LeaderboardId) -> Result<LeaderboardSnapshot> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.snapshot(leaderboard_id).await
    }

    async fn version(&self) -> Result<u64> {
        self.inner.version().await
    }
}
