//! Rating engine replaying match logs into leaderboard standings
//!
//! This module holds the Elo-style replay used for every leaderboard read
//! and the rating table it accumulates into.

pub mod engine;
pub mod table;

// Re-export commonly used types
pub use engine::{compute, win_probability, MatchDelta, Ranking, Standings, K_FACTOR};
pub use table::{RatingTable, BASELINE_RATING};
