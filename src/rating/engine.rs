//! Chronological Elo replay over team match logs
//!
//! Ratings are never stored. Every call rebuilds them from the baseline by
//! replaying the whole match log in `inserted_at` order, so the same roster
//! and log always produce the same standings.

use crate::rating::table::{RatingTable, BASELINE_RATING};
use crate::types::{Match, MatchId, Player};
use serde::{Deserialize, Serialize};
use skillratings::elo::{expected_score, EloRating};
use tracing::{debug, trace, warn};

/// Maximum rating swing of a single match
pub const K_FACTOR: f64 = 30.0;

/// Roster player with their final rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub player: Player,
    pub rating: f64,
}

/// Rating swing attributed to one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDelta {
    pub match_id: MatchId,
    /// Added to every winner, subtracted from every loser. Never negative.
    pub delta: f64,
    /// False when the match was skipped for having an empty side
    pub applied: bool,
}

/// Output of one replay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    /// Roster sorted by descending rating, ties in roster order
    pub rankings: Vec<Ranking>,
    /// One entry per match, most recent first
    pub match_deltas: Vec<MatchDelta>,
}

impl Standings {
    /// Match deltas in display order (most recent first)
    pub fn deltas(&self) -> Vec<f64> {
        self.match_deltas.iter().map(|d| d.delta).collect()
    }

    /// Final rating of a roster player
    pub fn rating_of(&self, player_id: i64) -> Option<f64> {
        self.rankings
            .iter()
            .find(|ranking| ranking.player.id == player_id)
            .map(|ranking| ranking.rating)
    }
}

/// Probability that the side rated `winner_average` beats `loser_average`
pub fn win_probability(winner_average: f64, loser_average: f64) -> f64 {
    let (expected_winner, _expected_loser) = expected_score(
        &EloRating {
            rating: winner_average,
        },
        &EloRating {
            rating: loser_average,
        },
    );
    expected_winner
}

/// Replay `matches` over `players` and rank the roster
///
/// Neither slice is reordered. Matches referencing ids outside the roster
/// use the baseline for those ids; matches with an empty side are skipped.
pub fn compute(players: &[Player], matches: &[Match]) -> Standings {
    let mut table = RatingTable::from_roster(players);

    // Stable sort keeps log order for equal timestamps
    let mut order: Vec<&Match> = matches.iter().collect();
    order.sort_by_key(|m| m.inserted_at);

    let mut match_deltas = Vec::with_capacity(order.len());
    for m in order {
        if m.is_degenerate() {
            warn!(
                "Skipping match {} with {} winners and {} losers",
                m.id,
                m.winners.len(),
                m.losers.len()
            );
            match_deltas.push(MatchDelta {
                match_id: m.id,
                delta: 0.0,
                applied: false,
            });
            continue;
        }

        match_deltas.push(MatchDelta {
            match_id: m.id,
            delta: replay_match(&mut table, m),
            applied: true,
        });
    }
    match_deltas.reverse();

    let mut rankings: Vec<Ranking> = players
        .iter()
        .map(|player| Ranking {
            player: player.clone(),
            rating: table.rating(player.id),
        })
        .collect();
    rankings.sort_by(|a, b| b.rating.total_cmp(&a.rating));

    debug!(
        "Replayed {} matches for {} players",
        match_deltas.len(),
        rankings.len()
    );

    Standings {
        rankings,
        match_deltas,
    }
}

/// Apply one non-degenerate match to the table and return its delta
fn replay_match(table: &mut RatingTable, m: &Match) -> f64 {
    // Both sides are non-empty here
    let winner_average = table.average(&m.winners).unwrap_or(BASELINE_RATING);
    let loser_average = table.average(&m.losers).unwrap_or(BASELINE_RATING);

    let delta = K_FACTOR * (1.0 - win_probability(winner_average, loser_average));

    // Every member moves from the rating they held before this match
    let winner_ratings: Vec<f64> = m.winners.iter().map(|id| table.rating(*id)).collect();
    let loser_ratings: Vec<f64> = m.losers.iter().map(|id| table.rating(*id)).collect();

    for (id, rating) in m.winners.iter().zip(winner_ratings) {
        table.set(*id, rating + delta);
    }
    for (id, rating) in m.losers.iter().zip(loser_ratings) {
        table.set(*id, rating - delta);
    }

    trace!(
        match_id = m.id,
        winner_average,
        loser_average,
        delta,
        "Applied match"
    );

    delta
}
