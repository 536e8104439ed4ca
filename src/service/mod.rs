//! Service layer over the leaderboard store
//!
//! Mutations go to the store; reads replay the store snapshot through the
//! rating engine and return presentation views.

pub mod leaderboard;

pub use leaderboard::LeaderboardService;
