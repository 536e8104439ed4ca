//! JSON snapshot documents for seeding and saving a store
//!
//! The layout mirrors what the remote record store returns for a nested
//! leaderboard select: each leaderboard carries its players, matches and
//! editor emails. Matches may use either record shape.

use crate::error::{LeaderboardError, Result};
use crate::types::{LeaderboardId, MatchRecord, Player};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;

/// Whole store contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub leaderboards: Vec<LeaderboardDocument>,
}

/// One leaderboard with everything it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardDocument {
    pub id: LeaderboardId,
    pub name: String,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
    #[serde(default)]
    pub editors: Vec<String>,
}

impl SnapshotDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            LeaderboardError::Snapshot {
                message: format!("Invalid snapshot document: {}", e),
            }
            .into()
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            LeaderboardError::Snapshot {
                message: format!("Failed to serialize snapshot: {}", e),
            }
            .into()
        })
    }

    /// Read a snapshot file; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Failed to parse snapshot file {}", path.display()))
    }

    /// Write the snapshot next to `path` and rename it into place
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let mut temp_name = path.file_name().map(OsString::from).unwrap_or_default();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        std::fs::write(&temp_path, json)
            .with_context(|| format!("Failed to write snapshot file {}", temp_path.display()))?;
        if let Err(e) = std::fs::rename(&temp_path, path) {
            std::fs::remove_file(&temp_path).ok();
            return Err(e)
                .with_context(|| format!("Failed to replace snapshot file {}", path.display()));
        }
        Ok(())
    }
}
