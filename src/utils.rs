//! Utility functions for the leaderboard service

use crate::error::{LeaderboardError, Result};
use crate::types::PlayerId;

/// Parse a comma separated list of player ids such as `1, 4,7`
pub fn parse_player_ids(input: &str) -> Result<Vec<PlayerId>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<PlayerId>().map_err(|_| {
                anyhow::Error::from(LeaderboardError::InvalidMatch {
                    reason: format!("Not a player id: {:?}", part),
                })
            })
        })
        .collect()
}
