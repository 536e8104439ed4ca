//! Error types for the leaderboard service
//!
//! The rating engine itself never fails; these errors belong to the store,
//! snapshot and configuration layers around it.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific leaderboard scenarios
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("Leaderboard not found: {leaderboard_id}")]
    LeaderboardNotFound { leaderboard_id: i64 },

    #[error("Invalid leaderboard: {reason}")]
    InvalidLeaderboard { reason: String },

    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: i64 },

    #[error("Invalid player: {reason}")]
    InvalidPlayer { reason: String },

    #[error("Invalid match: {reason}")]
    InvalidMatch { reason: String },

    #[error("Invalid editor: {reason}")]
    InvalidEditor { reason: String },

    #[error("Snapshot error: {message}")]
    Snapshot { message: String },

    #[error("Internal store error: {message}")]
    Internal { message: String },
}
