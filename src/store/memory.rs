//! In-memory leaderboard store
//!
//! Keeps every record behind a single `RwLock` so a snapshot always sees a
//! roster and match log from the same version.

use crate::error::{LeaderboardError, Result};
use crate::store::snapshot::{LeaderboardDocument, SnapshotDocument};
use crate::store::{LeaderboardSnapshot, LeaderboardStore};
use crate::types::{Editor, Leaderboard, LeaderboardId, Match, MatchId, Player, PlayerId};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct StoredPlayer {
    leaderboard_id: LeaderboardId,
    player: Player,
}

#[derive(Debug, Clone)]
struct StoredMatch {
    leaderboard_id: LeaderboardId,
    record: Match,
}

#[derive(Debug, Default)]
struct StoreState {
    leaderboards: BTreeMap<LeaderboardId, Leaderboard>,
    // Keyed by id, so iteration order is insertion order
    players: BTreeMap<PlayerId, StoredPlayer>,
    matches: BTreeMap<MatchId, StoredMatch>,
    editors: Vec<Editor>,
    next_leaderboard_id: LeaderboardId,
    next_player_id: PlayerId,
    next_match_id: MatchId,
    version: u64,
}

impl StoreState {
    fn new() -> Self {
        Self {
            next_leaderboard_id: 1,
            next_player_id: 1,
            next_match_id: 1,
            ..Default::default()
        }
    }

    fn require_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<&Leaderboard> {
        self.leaderboards.get(&leaderboard_id).ok_or_else(|| {
            LeaderboardError::LeaderboardNotFound { leaderboard_id }.into()
        })
    }

    fn touch(&mut self) {
        self.version += 1;
    }
}

/// In-memory leaderboard store implementation
#[derive(Debug)]
pub struct InMemoryLeaderboardStore {
    state: RwLock<StoreState>,
}

impl InMemoryLeaderboardStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::new()),
        }
    }

    /// Build a store from a snapshot document, keeping its ids
    pub fn from_document(document: SnapshotDocument) -> Result<Self> {
        let mut state = StoreState::new();
        let mut player_ids = HashSet::new();
        let mut match_ids = HashSet::new();

        for board in document.leaderboards {
            if state.leaderboards.contains_key(&board.id) {
                return Err(snapshot_error(format!("Duplicate leaderboard id {}", board.id)));
            }
            let name = validate_leaderboard_name(&board.name)
                .map_err(|e| snapshot_error(format!("Leaderboard {}: {}", board.id, e)))?;
            state
                .leaderboards
                .insert(board.id, Leaderboard { id: board.id, name });

            for player in board.players {
                if !player_ids.insert(player.id) {
                    return Err(snapshot_error(format!("Duplicate player id {}", player.id)));
                }
                let name = validate_player_name(&player.name)
                    .map_err(|e| snapshot_error(format!("Player {}: {}", player.id, e)))?;
                state.players.insert(
                    player.id,
                    StoredPlayer {
                        leaderboard_id: board.id,
                        player: Player::new(player.id, name),
                    },
                );
            }

            for record in board.matches {
                let record = record.into_match();
                if !match_ids.insert(record.id) {
                    return Err(snapshot_error(format!("Duplicate match id {}", record.id)));
                }
                state.matches.insert(
                    record.id,
                    StoredMatch {
                        leaderboard_id: board.id,
                        record,
                    },
                );
            }

            for email in board.editors {
                let email = validate_editor_email(&email)
                    .map_err(|e| snapshot_error(format!("Leaderboard {}: {}", board.id, e)))?;
                if is_editor(&state, board.id, &email) {
                    return Err(snapshot_error(format!(
                        "Duplicate editor {} on leaderboard {}",
                        email, board.id
                    )));
                }
                state.editors.push(Editor {
                    email,
                    leaderboard: board.id,
                });
            }
        }

        state.next_leaderboard_id = next_id(state.leaderboards.keys(), "leaderboard")?;
        state.next_player_id = next_id(state.players.keys(), "player")?;
        state.next_match_id = next_id(state.matches.keys(), "match")?;

        info!(
            "Loaded {} leaderboards, {} players and {} matches",
            state.leaderboards.len(),
            state.players.len(),
            state.matches.len()
        );

        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Export the whole store as a snapshot document
    pub fn to_document(&self) -> Result<SnapshotDocument> {
        let state = self.read()?;

        let leaderboards = state
            .leaderboards
            .values()
            .map(|board| LeaderboardDocument {
                id: board.id,
                name: board.name.clone(),
                players: players_of(&state, board.id),
                matches: matches_of(&state, board.id)
                    .into_iter()
                    .map(Into::into)
                    .collect(),
                editors: editors_of(&state, board.id)
                    .into_iter()
                    .map(|editor| editor.email)
                    .collect(),
            })
            .collect();

        Ok(SnapshotDocument { leaderboards })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| {
            LeaderboardError::Internal {
                message: "Failed to acquire store read lock".to_string(),
            }
            .into()
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|_| {
            LeaderboardError::Internal {
                message: "Failed to acquire store write lock".to_string(),
            }
            .into()
        })
    }
}

impl Default for InMemoryLeaderboardStore {
    fn default() -> Self {
        Self::new()
    }
}

fn snapshot_error(message: String) -> anyhow::Error {
    LeaderboardError::Snapshot { message }.into()
}

fn next_id<'a>(ids: impl Iterator<Item = &'a i64>, kind: &str) -> Result<i64> {
    match ids.max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| snapshot_error(format!("No {} ids left after {}", kind, max))),
    }
}

/// Hand out the counter's id and advance it
fn allocate_id(counter: &mut i64, kind: &str) -> Result<i64> {
    let id = *counter;
    *counter = id.checked_add(1).ok_or_else(|| LeaderboardError::Internal {
        message: format!("No {} ids left after {}", kind, id),
    })?;
    Ok(id)
}

fn is_editor(state: &StoreState, leaderboard_id: LeaderboardId, email: &str) -> bool {
    state
        .editors
        .iter()
        .any(|editor| editor.leaderboard == leaderboard_id && editor.email == email)
}

fn players_of(state: &StoreState, leaderboard_id: LeaderboardId) -> Vec<Player> {
    state
        .players
        .values()
        .filter(|stored| stored.leaderboard_id == leaderboard_id)
        .map(|stored| stored.player.clone())
        .collect()
}

fn matches_of(state: &StoreState, leaderboard_id: LeaderboardId) -> Vec<Match> {
    state
        .matches
        .values()
        .filter(|stored| stored.leaderboard_id == leaderboard_id)
        .map(|stored| stored.record.clone())
        .collect()
}

fn editors_of(state: &StoreState, leaderboard_id: LeaderboardId) -> Vec<Editor> {
    state
        .editors
        .iter()
        .filter(|editor| editor.leaderboard == leaderboard_id)
        .cloned()
        .collect()
}

fn validate_leaderboard_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LeaderboardError::InvalidLeaderboard {
            reason: "Leaderboard name cannot be empty".to_string(),
        }
        .into());
    }
    Ok(trimmed.to_string())
}

fn validate_player_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LeaderboardError::InvalidPlayer {
            reason: "Player name cannot be empty".to_string(),
        }
        .into());
    }
    Ok(trimmed.to_string())
}

fn validate_editor_email(email: &str) -> Result<String> {
    let trimmed = email.trim();
    if !trimmed.contains('@') {
        return Err(LeaderboardError::InvalidEditor {
            reason: format!("Not an email address: {:?}", trimmed),
        }
        .into());
    }
    Ok(trimmed.to_string())
}

fn validate_sides(
    state: &StoreState,
    leaderboard_id: LeaderboardId,
    winners: &[PlayerId],
    losers: &[PlayerId],
) -> Result<()> {
    if winners.is_empty() || losers.is_empty() {
        return Err(LeaderboardError::InvalidMatch {
            reason: "Both winners and losers are required".to_string(),
        }
        .into());
    }

    let mut seen = HashSet::new();
    for player_id in winners.iter().chain(losers) {
        if !seen.insert(*player_id) {
            return Err(LeaderboardError::InvalidMatch {
                reason: format!("Player {} listed more than once", player_id),
            }
            .into());
        }

        match state.players.get(player_id) {
            Some(stored) if stored.leaderboard_id == leaderboard_id => {}
            _ => {
                return Err(LeaderboardError::PlayerNotFound {
                    player_id: *player_id,
                }
                .into())
            }
        }
    }

    Ok(())
}

#[async_trait]
impl LeaderboardStore for InMemoryLeaderboardStore {
    async fn create_leaderboard(&self, name: &str) -> Result<Leaderboard> {
        let name = validate_leaderboard_name(name)?;
        let mut state = self.write()?;

        let id = allocate_id(&mut state.next_leaderboard_id, "leaderboard")?;
        let leaderboard = Leaderboard { id, name };
        state.leaderboards.insert(leaderboard.id, leaderboard.clone());
        state.touch();

        debug!("Created leaderboard {} ({})", leaderboard.id, leaderboard.name);
        Ok(leaderboard)
    }

    async fn list_leaderboards(&self) -> Result<Vec<Leaderboard>> {
        let state = self.read()?;
        Ok(state.leaderboards.values().cloned().collect())
    }

    async fn delete_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<bool> {
        let mut state = self.write()?;

        if state.leaderboards.remove(&leaderboard_id).is_none() {
            return Ok(false);
        }
        state
            .players
            .retain(|_, stored| stored.leaderboard_id != leaderboard_id);
        state
            .matches
            .retain(|_, stored| stored.leaderboard_id != leaderboard_id);
        state
            .editors
            .retain(|editor| editor.leaderboard != leaderboard_id);
        state.touch();

        debug!("Deleted leaderboard {}", leaderboard_id);
        Ok(true)
    }

    async fn add_player(&self, leaderboard_id: LeaderboardId, name: &str) -> Result<Player> {
        let name = validate_player_name(name)?;
        let mut state = self.write()?;
        state.require_leaderboard(leaderboard_id)?;

        let player = Player::new(allocate_id(&mut state.next_player_id, "player")?, name);
        state.players.insert(
            player.id,
            StoredPlayer {
                leaderboard_id,
                player: player.clone(),
            },
        );
        state.touch();

        debug!("Added player {} to leaderboard {}", player.id, leaderboard_id);
        Ok(player)
    }

    async fn remove_player(&self, player_id: PlayerId) -> Result<bool> {
        let mut state = self.write()?;

        let removed = state.players.remove(&player_id).is_some();
        if removed {
            state.touch();
            debug!("Removed player {}", player_id);
        }
        Ok(removed)
    }

    async fn record_match(
        &self,
        leaderboard_id: LeaderboardId,
        winners: Vec<PlayerId>,
        losers: Vec<PlayerId>,
    ) -> Result<Match> {
        let mut state = self.write()?;
        state.require_leaderboard(leaderboard_id)?;
        validate_sides(&state, leaderboard_id, &winners, &losers)?;

        let record = Match {
            id: allocate_id(&mut state.next_match_id, "match")?,
            winners,
            losers,
            inserted_at: Utc::now(),
        };
        state.matches.insert(
            record.id,
            StoredMatch {
                leaderboard_id,
                record: record.clone(),
            },
        );
        state.touch();

        debug!(
            "Recorded match {} on leaderboard {}: {:?} beat {:?}",
            record.id, leaderboard_id, record.winners, record.losers
        );
        Ok(record)
    }

    async fn remove_match(&self, match_id: MatchId) -> Result<bool> {
        let mut state = self.write()?;

        let removed = state.matches.remove(&match_id).is_some();
        if removed {
            state.touch();
            debug!("Removed match {}", match_id);
        }
        Ok(removed)
    }

    async fn add_editor(&self, leaderboard_id: LeaderboardId, email: &str) -> Result<Editor> {
        let email = validate_editor_email(email)?;

        let mut state = self.write()?;
        state.require_leaderboard(leaderboard_id)?;

        if is_editor(&state, leaderboard_id, &email) {
            return Err(LeaderboardError::InvalidEditor {
                reason: format!("{} already edits leaderboard {}", email, leaderboard_id),
            }
            .into());
        }

        let editor = Editor {
            email,
            leaderboard: leaderboard_id,
        };
        state.editors.push(editor.clone());
        state.touch();

        Ok(editor)
    }

    async fn remove_editor(&self, leaderboard_id: LeaderboardId, email: &str) -> Result<bool> {
        let email = email.trim();
        let mut state = self.write()?;

        let before = state.editors.len();
        state
            .editors
            .retain(|editor| !(editor.leaderboard == leaderboard_id && editor.email == email));
        let removed = state.editors.len() != before;
        if removed {
            state.touch();
        }
        Ok(removed)
    }

    async fn editors(&self, leaderboard_id: LeaderboardId) -> Result<Vec<Editor>> {
        let state = self.read()?;
        state.require_leaderboard(leaderboard_id)?;
        Ok(editors_of(&state, leaderboard_id))
    }

    async fn snapshot(&self, leaderboard_id: LeaderboardId) -> Result<LeaderboardSnapshot> {
        let state = self.read()?;
        let leaderboard = state.require_leaderboard(leaderboard_id)?.clone();

        Ok(LeaderboardSnapshot {
            leaderboard,
            players: players_of(&state, leaderboard_id),
            matches: matches_of(&state, leaderboard_id),
            editors: editors_of(&state, leaderboard_id),
            version: state.version,
        })
    }

    async fn version(&self) -> Result<u64> {
        Ok(self.read()?.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MatchRecord;

    async fn board_with_players(
        store: &InMemoryLeaderboardStore,
        names: &[&str],
    ) -> (Leaderboard, Vec<Player>) {
        let board = store.create_leaderboard("Office").await.unwrap();
        let mut players = Vec::new();
        for name in names {
            players.push(store.add_player(board.id, name).await.unwrap());
        }
        (board, players)
    }

    #[tokio::test]
    async fn test_create_and_list_leaderboards() {
        let store = InMemoryLeaderboardStore::new();

        let first = store.create_leaderboard("Foosball").await.unwrap();
        let second = store.create_leaderboard("  Darts ").await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(second.name, "Darts");
        assert_eq!(store.list_leaderboards().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_names_rejected() {
        let store = InMemoryLeaderboardStore::new();
        assert!(store.create_leaderboard("   ").await.is_err());

        let board = store.create_leaderboard("Office").await.unwrap();
        assert!(store.add_player(board.id, "").await.is_err());
    }

    #[tokio::test]
    async fn test_add_player_to_missing_leaderboard() {
        let store = InMemoryLeaderboardStore::new();
        let err = store.add_player(9, "Ann").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LeaderboardError>(),
            Some(LeaderboardError::LeaderboardNotFound { leaderboard_id: 9 })
        ));
    }

    #[tokio::test]
    async fn test_version_bumps_on_mutation_only() {
        let store = InMemoryLeaderboardStore::new();
        assert_eq!(store.version().await.unwrap(), 0);

        let (board, players) = board_with_players(&store, &["Ann", "Bob"]).await;
        assert_eq!(store.version().await.unwrap(), 3);

        store
            .record_match(board.id, vec![players[0].id], vec![players[1].id])
            .await
            .unwrap();
        assert_eq!(store.version().await.unwrap(), 4);

        store.snapshot(board.id).await.unwrap();
        assert!(!store.remove_match(999).await.unwrap());
        assert_eq!(store.version().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_record_match_validation() {
        let store = InMemoryLeaderboardStore::new();
        let (board, players) = board_with_players(&store, &["Ann", "Bob"]).await;
        let other = store.create_leaderboard("Other").await.unwrap();
        let stranger = store.add_player(other.id, "Cid").await.unwrap();

        assert!(store
            .record_match(board.id, vec![], vec![players[1].id])
            .await
            .is_err());
        assert!(store
            .record_match(board.id, vec![players[0].id], vec![players[0].id])
            .await
            .is_err());
        assert!(store
            .record_match(board.id, vec![players[0].id], vec![stranger.id])
            .await
            .is_err());
        assert!(store
            .record_match(board.id, vec![players[0].id], vec![players[1].id])
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_removed_player_keeps_match_references() {
        let store = InMemoryLeaderboardStore::new();
        let (board, players) = board_with_players(&store, &["Ann", "Bob"]).await;
        store
            .record_match(board.id, vec![players[0].id], vec![players[1].id])
            .await
            .unwrap();

        assert!(store.remove_player(players[1].id).await.unwrap());

        let snapshot = store.snapshot(board.id).await.unwrap();
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.matches.len(), 1);
        assert_eq!(snapshot.matches[0].losers, vec![players[1].id]);
    }

    #[tokio::test]
    async fn test_delete_leaderboard_cascades() {
        let store = InMemoryLeaderboardStore::new();
        let (board, players) = board_with_players(&store, &["Ann", "Bob"]).await;
        let other = store.create_leaderboard("Other").await.unwrap();
        store.add_player(other.id, "Cid").await.unwrap();
        store
            .record_match(board.id, vec![players[0].id], vec![players[1].id])
            .await
            .unwrap();
        store.add_editor(board.id, "ann@example.com").await.unwrap();

        assert!(store.delete_leaderboard(board.id).await.unwrap());
        assert!(!store.delete_leaderboard(board.id).await.unwrap());
        assert!(store.snapshot(board.id).await.is_err());

        let document = store.to_document().unwrap();
        assert_eq!(document.leaderboards.len(), 1);
        assert_eq!(document.leaderboards[0].players.len(), 1);
        assert!(document.leaderboards[0].matches.is_empty());
    }

    #[tokio::test]
    async fn test_editors_scoped_to_leaderboard() {
        let store = InMemoryLeaderboardStore::new();
        let first = store.create_leaderboard("First").await.unwrap();
        let second = store.create_leaderboard("Second").await.unwrap();

        store.add_editor(first.id, "ann@example.com").await.unwrap();
        store.add_editor(second.id, "ann@example.com").await.unwrap();
        assert!(store.add_editor(first.id, "ann@example.com").await.is_err());
        assert!(store.add_editor(first.id, "not-an-email").await.is_err());

        assert!(store.remove_editor(first.id, "ann@example.com").await.unwrap());
        assert!(store.editors(first.id).await.unwrap().is_empty());
        assert_eq!(store.editors(second.id).await.unwrap().len(), 1);

        let padded = " bob@example.com ";
        let editor = store.add_editor(first.id, padded).await.unwrap();
        assert_eq!(editor.email, "bob@example.com");
        assert!(store.add_editor(first.id, "bob@example.com").await.is_err());
        assert!(store.remove_editor(first.id, padded).await.unwrap());
        assert!(store.editors(first.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_from_document_keeps_ids() {
        let document = SnapshotDocument::from_json(
            r#"{"leaderboards": [{
                "id": 4,
                "name": "Pool",
                "players": [{"id": 10, "name": "Ann"}, {"id": 12, "name": "Bob"}],
                "matches": [{"id": 30, "winner1": 10, "loser1": 12, "inserted_at": "2022-06-01T12:00:00Z"}]
            }]}"#,
        )
        .unwrap();
        let store = InMemoryLeaderboardStore::from_document(document).unwrap();

        let snapshot = store.snapshot(4).await.unwrap();
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.matches[0].winners, vec![10]);

        let player = store.add_player(4, "Cid").await.unwrap();
        assert_eq!(player.id, 13);
        let recorded = store.record_match(4, vec![13], vec![10]).await.unwrap();
        assert_eq!(recorded.id, 31);

        let exported = store.to_document().unwrap();
        assert!(matches!(
            exported.leaderboards[0].matches[0],
            MatchRecord::Teams(_)
        ));
    }

    #[tokio::test]
    async fn test_from_document_rejects_duplicate_ids() {
        let document = SnapshotDocument::from_json(
            r#"{"leaderboards": [
                {"id": 1, "name": "A", "players": [{"id": 1, "name": "Ann"}]},
                {"id": 2, "name": "B", "players": [{"id": 1, "name": "Bob"}]}
            ]}"#,
        )
        .unwrap();

        let err = InMemoryLeaderboardStore::from_document(document).unwrap_err();
        assert!(err.to_string().contains("Duplicate player id 1"));
    }

    #[tokio::test]
    async fn test_from_document_rejects_exhausted_ids() {
        let document = SnapshotDocument::from_json(&format!(
            r#"{{"leaderboards": [
                {{"id": 1, "name": "A", "players": [{{"id": {}, "name": "Ann"}}]}}
            ]}}"#,
            i64::MAX
        ))
        .unwrap();

        let err = InMemoryLeaderboardStore::from_document(document).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LeaderboardError>(),
            Some(LeaderboardError::Snapshot { .. })
        ));
        assert!(err.to_string().contains("No player ids left"));
    }

    #[test]
    fn test_allocate_id_stops_at_max() {
        let mut counter = i64::MAX - 1;
        assert_eq!(allocate_id(&mut counter, "match").unwrap(), i64::MAX - 1);

        let err = allocate_id(&mut counter, "match").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LeaderboardError>(),
            Some(LeaderboardError::Internal { .. })
        ));
        assert_eq!(counter, i64::MAX);
    }

    #[tokio::test]
    async fn test_from_document_validates_records() {
        let blank_player = SnapshotDocument::from_json(
            r#"{"leaderboards": [{"id": 1, "name": "A", "players": [{"id": 1, "name": "  "}]}]}"#,
        )
        .unwrap();
        assert!(InMemoryLeaderboardStore::from_document(blank_player).is_err());

        let blank_board =
            SnapshotDocument::from_json(r#"{"leaderboards": [{"id": 1, "name": ""}]}"#).unwrap();
        assert!(InMemoryLeaderboardStore::from_document(blank_board).is_err());

        let bad_editor = SnapshotDocument::from_json(
            r#"{"leaderboards": [{"id": 1, "name": "A", "editors": ["nobody"]}]}"#,
        )
        .unwrap();
        assert!(InMemoryLeaderboardStore::from_document(bad_editor).is_err());

        let twice = SnapshotDocument::from_json(
            r#"{"leaderboards": [{"id": 1, "name": "A", "editors": ["ann@example.com", " ann@example.com"]}]}"#,
        )
        .unwrap();
        let err = InMemoryLeaderboardStore::from_document(twice).unwrap_err();
        assert!(err.to_string().contains("Duplicate editor ann@example.com"));
    }

    #[tokio::test]
    async fn test_from_document_trims_imported_values() {
        let document = SnapshotDocument::from_json(
            r#"{"leaderboards": [{
                "id": 1,
                "name": " Pool ",
                "players": [{"id": 1, "name": "Ann "}],
                "editors": [" ann@example.com "]
            }]}"#,
        )
        .unwrap();
        let store = InMemoryLeaderboardStore::from_document(document).unwrap();

        let snapshot = store.snapshot(1).await.unwrap();
        assert_eq!(snapshot.leaderboard.name, "Pool");
        assert_eq!(snapshot.players[0].name, "Ann");
        assert!(store.remove_editor(1, "ann@example.com").await.unwrap());
    }
}
