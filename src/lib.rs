//! Ladder Board - leaderboard rating engine
//!
//! This crate replays a leaderboard's match log into Elo-style standings,
//! with a store boundary, a service that recomputes after every change and
//! presentation views for terminal or JSON output.

pub mod config;
pub mod error;
pub mod rating;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;
pub mod view;

// Re-export commonly used types and traits
pub use error::{LeaderboardError, Result};
pub use types::*;

// Re-export key components
pub use rating::{compute, Standings};
pub use service::LeaderboardService;
pub use store::{InMemoryLeaderboardStore, LeaderboardStore};
pub use view::LeaderboardView;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
