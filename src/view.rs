//! Presentation rows built from a snapshot and its standings
//!
//! Ratings stay unrounded inside the engine; rounding and the `±` prefix
//! only happen here.

use crate::rating::Standings;
use crate::store::LeaderboardSnapshot;
use crate::types::{Editor, Leaderboard, Match, MatchId, Player, PlayerId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One line of the ranking table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    /// 1-based position in the table
    pub position: usize,
    pub player_id: PlayerId,
    pub name: String,
    pub rating: f64,
    pub display_rating: i64,
}

/// One line of the match history, most recent first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRow {
    pub match_id: MatchId,
    pub winners: Vec<String>,
    pub losers: Vec<String>,
    pub played_on: NaiveDate,
    pub delta: f64,
    pub display_delta: String,
}

/// Everything a leaderboard page shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardView {
    pub leaderboard: Leaderboard,
    /// Store version the view was computed from
    pub version: u64,
    pub standings: Vec<StandingRow>,
    pub matches: Vec<MatchRow>,
    pub editors: Vec<Editor>,
}

/// Round a rating for display
pub fn display_rating(rating: f64) -> i64 {
    rating.round() as i64
}

/// Format a match delta as a symmetric swing, e.g. `±15`
pub fn display_delta(delta: f64) -> String {
    format!("±{}", delta.round() as i64)
}

fn player_label(names: &HashMap<PlayerId, &str>, player_id: PlayerId) -> String {
    names
        .get(&player_id)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("#{}", player_id))
}

impl LeaderboardView {
    /// Combine a snapshot with the standings computed from it
    pub fn build(snapshot: &LeaderboardSnapshot, standings: &Standings) -> Self {
        let names: HashMap<PlayerId, &str> = snapshot
            .players
            .iter()
            .map(|player: &Player| (player.id, player.name.as_str()))
            .collect();
        let by_id: HashMap<MatchId, &Match> =
            snapshot.matches.iter().map(|m| (m.id, m)).collect();

        let standings_rows = standings
            .rankings
            .iter()
            .enumerate()
            .map(|(i, ranking)| StandingRow {
                position: i + 1,
                player_id: ranking.player.id,
                name: ranking.player.name.clone(),
                rating: ranking.rating,
                display_rating: display_rating(ranking.rating),
            })
            .collect();

        let match_rows = standings
            .match_deltas
            .iter()
            .filter_map(|entry| {
                let m = by_id.get(&entry.match_id)?;
                Some(MatchRow {
                    match_id: m.id,
                    winners: m.winners.iter().map(|id| player_label(&names, *id)).collect(),
                    losers: m.losers.iter().map(|id| player_label(&names, *id)).collect(),
                    played_on: m.inserted_at.date_naive(),
                    delta: entry.delta,
                    display_delta: display_delta(entry.delta),
                })
            })
            .collect();

        Self {
            leaderboard: snapshot.leaderboard.clone(),
            version: snapshot.version,
            standings: standings_rows,
            matches: match_rows,
            editors: snapshot.editors.clone(),
        }
    }

    /// Plain-text tables for terminal output
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LeaderboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self
            .standings
            .iter()
            .map(|row| row.name.chars().count())
            .max()
            .unwrap_or(0)
            .max(4);

        writeln!(f, "Leaderboard {}", self.leaderboard.name)?;
        writeln!(f)?;
        writeln!(f, "  #  {:<name_width$}  Score", "Name")?;
        for row in &self.standings {
            writeln!(
                f,
                "{:>3}  {:<name_width$}  {:>5}",
                row.position, row.name, row.display_rating
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Matches")?;
        if self.matches.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for row in &self.matches {
            writeln!(
                f,
                "  {}  {} beat {}  {}",
                row.played_on,
                row.winners.join(", "),
                row.losers.join(", "),
                row.display_delta
            )?;
        }

        Ok(())
    }
}
