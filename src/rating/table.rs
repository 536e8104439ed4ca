//! Per-replay rating mapping with baseline-on-miss lookups

use crate::types::{Player, PlayerId};
use std::collections::HashMap;

/// Rating every player holds before their first match
pub const BASELINE_RATING: f64 = 1000.0;

/// Ratings accumulated during one replay of a match log
///
/// Lookups for ids never seen return [`BASELINE_RATING`] without inserting
/// them, so players missing from the roster can take part in a match
/// without ever showing up in the standings.
#[derive(Debug, Clone, Default)]
pub struct RatingTable {
    ratings: HashMap<PlayerId, f64>,
}

impl RatingTable {
    /// Seed the table with every roster player at the baseline
    pub fn from_roster(players: &[Player]) -> Self {
        Self {
            ratings: players
                .iter()
                .map(|player| (player.id, BASELINE_RATING))
                .collect(),
        }
    }

    /// Current rating of a player, the baseline if never seen
    pub fn rating(&self, player_id: PlayerId) -> f64 {
        self.ratings
            .get(&player_id)
            .copied()
            .unwrap_or(BASELINE_RATING)
    }

    pub fn set(&mut self, player_id: PlayerId, rating: f64) {
        self.ratings.insert(player_id, rating);
    }

    /// Arithmetic mean of the current ratings of a side
    ///
    /// Returns `None` for an empty side instead of a NaN average.
    pub fn average(&self, player_ids: &[PlayerId]) -> Option<f64> {
        if player_ids.is_empty() {
            return None;
        }

        let total: f64 = player_ids.iter().map(|id| self.rating(*id)).sum();
        Some(total / player_ids.len() as f64)
    }

    #[cfg(test)]
    fn contains(&self, player_id: PlayerId) -> bool {
        self.ratings.contains_key(&player_id)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.ratings.len()
    }
}
