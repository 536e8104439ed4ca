//! Command line entry point for Ladder Board
//!
//! Loads a leaderboard snapshot file into an in-memory store, applies the
//! requested change, saves the file back and prints the recomputed
//! standings.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use ladder_board::config::AppConfig;
use ladder_board::store::{InMemoryLeaderboardStore, SnapshotDocument};
use ladder_board::utils::parse_player_ids;
use ladder_board::{Leaderboard, LeaderboardId, LeaderboardService, LeaderboardView};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Ladder Board - Elo standings for casual leaderboards
#[derive(Parser)]
#[command(
    name = "ladder-board",
    version,
    about = "Track match results and Elo-style standings for team leaderboards",
    long_about = "Ladder Board keeps leaderboards, rosters and match logs in a JSON snapshot \
                 file and replays the full match history on every read to rank players. \
                 Teams of any size are supported; every team member shares the same rating swing."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Snapshot file override
    #[arg(long, value_name = "FILE", help = "Override leaderboard data file")]
    data: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Print views as JSON
    #[arg(long, help = "Print standings as JSON instead of text tables")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List leaderboards
    Leaderboards,
    /// Show standings and match history
    Standings {
        /// Leaderboard ID
        #[arg(short = 'b', long)]
        leaderboard: Option<LeaderboardId>,
    },
    /// Create a leaderboard
    CreateLeaderboard {
        /// Leaderboard name
        #[arg(short, long)]
        name: String,
    },
    /// Delete a leaderboard with its players and matches
    DeleteLeaderboard {
        /// Leaderboard ID
        #[arg(short = 'b', long)]
        leaderboard: LeaderboardId,
    },
    /// Register a player
    AddPlayer {
        /// Leaderboard ID
        #[arg(short = 'b', long)]
        leaderboard: Option<LeaderboardId>,
        /// Player name
        #[arg(short, long)]
        name: String,
    },
    /// Remove a player (their matches stay in the log)
    RemovePlayer {
        /// Player ID
        #[arg(short, long)]
        player: i64,
    },
    /// Record a match result
    Record {
        /// Leaderboard ID
        #[arg(short = 'b', long)]
        leaderboard: Option<LeaderboardId>,
        /// Comma separated winner IDs
        #[arg(short, long)]
        winners: String,
        /// Comma separated loser IDs
        #[arg(short, long)]
        losers: String,
    },
    /// Remove a recorded match
    RemoveMatch {
        /// Match ID
        #[arg(short, long)]
        match_id: i64,
    },
    /// Allow an email to edit a leaderboard
    AddEditor {
        /// Leaderboard ID
        #[arg(short = 'b', long)]
        leaderboard: Option<LeaderboardId>,
        /// Editor email
        #[arg(short, long)]
        email: String,
    },
    /// Revoke an editor
    RemoveEditor {
        /// Leaderboard ID
        #[arg(short = 'b', long)]
        leaderboard: Option<LeaderboardId>,
        /// Editor email
        #[arg(short, long)]
        email: String,
    },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from file or environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(data) = &args.data {
        config.data.snapshot_path = data.clone();
    }

    ladder_board::config::validate_config(&config)?;
    Ok(config)
}

/// Pick the leaderboard a command targets
async fn resolve_leaderboard(
    service: &LeaderboardService,
    config: &AppConfig,
    requested: Option<LeaderboardId>,
) -> Result<LeaderboardId> {
    if let Some(id) = requested.or(config.data.default_leaderboard) {
        return Ok(id);
    }

    let leaderboards = service.leaderboards().await?;
    match leaderboards.as_slice() {
        [only] => Ok(only.id),
        [] => Err(anyhow!("No leaderboards yet, create one first")),
        _ => Err(anyhow!(
            "Several leaderboards exist, pass --leaderboard (one of: {})",
            leaderboards
                .iter()
                .map(|board| format!("{} {}", board.id, board.name))
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

fn render_leaderboards(leaderboards: &[Leaderboard], json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(leaderboards)?);
    }
    Ok(leaderboards
        .iter()
        .map(|board| format!("{:>4}  {}\n", board.id, board.name))
        .collect())
}

fn print_view(view: &LeaderboardView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        print!("{}", view.render_text());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let path = config.data.snapshot_path.clone();
    debug!("Loading leaderboards from {}", path.display());
    let store = Arc::new(InMemoryLeaderboardStore::from_document(
        SnapshotDocument::load(&path)?,
    )?);
    let service = LeaderboardService::new(store.clone());
    let version_before = service.store().version().await?;

    // Leaderboard to show once the command is applied
    let show = match args.command {
        Commands::Leaderboards => {
            let leaderboards = service.leaderboards().await?;
            print!("{}", render_leaderboards(&leaderboards, args.json)?);
            if args.json {
                println!();
            }
            None
        }
        Commands::Standings { leaderboard } => {
            Some(resolve_leaderboard(&service, &config, leaderboard).await?)
        }
        Commands::CreateLeaderboard { name } => {
            let board = service.create_leaderboard(&name).await?;
            println!("Created leaderboard {} ({})", board.id, board.name);
            Some(board.id)
        }
        Commands::DeleteLeaderboard { leaderboard } => {
            if !service.delete_leaderboard(leaderboard).await? {
                return Err(anyhow!("Leaderboard {} does not exist", leaderboard));
            }
            println!("Deleted leaderboard {}", leaderboard);
            None
        }
        Commands::AddPlayer { leaderboard, name } => {
            let id = resolve_leaderboard(&service, &config, leaderboard).await?;
            let player = service.add_player(id, &name).await?;
            println!("Added {} as player {}", player.name, player.id);
            Some(id)
        }
        Commands::RemovePlayer { player } => {
            if !service.remove_player(player).await? {
                return Err(anyhow!("Player {} does not exist", player));
            }
            println!("Removed player {}", player);
            None
        }
        Commands::Record {
            leaderboard,
            winners,
            losers,
        } => {
            let id = resolve_leaderboard(&service, &config, leaderboard).await?;
            let recorded = service
                .record_match(id, parse_player_ids(&winners)?, parse_player_ids(&losers)?)
                .await?;
            println!("Recorded match {}", recorded.id);
            Some(id)
        }
        Commands::RemoveMatch { match_id } => {
            if !service.remove_match(match_id).await? {
                return Err(anyhow!("Match {} does not exist", match_id));
            }
            println!("Removed match {}", match_id);
            None
        }
        Commands::AddEditor { leaderboard, email } => {
            let id = resolve_leaderboard(&service, &config, leaderboard).await?;
            let editor = service.add_editor(id, &email).await?;
            println!("{} can now edit leaderboard {}", editor.email, id);
            None
        }
        Commands::RemoveEditor { leaderboard, email } => {
            let id = resolve_leaderboard(&service, &config, leaderboard).await?;
            if !service.remove_editor(id, &email).await? {
                return Err(anyhow!("{} is not an editor of leaderboard {}", email, id));
            }
            println!("Removed editor {}", email);
            None
        }
    };

    if service.store().version().await? != version_before {
        store.to_document()?.save(&path)?;
        info!("Saved leaderboards to {}", path.display());
    }

    if let Some(id) = show {
        print_view(&service.view(id).await?, args.json)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boards() -> Vec<Leaderboard> {
        vec![
            Leaderboard {
                id: 1,
                name: "Office".to_string(),
            },
            Leaderboard {
                id: 12,
                name: "Chess club".to_string(),
            },
        ]
    }

    #[test]
    fn test_render_leaderboards_text() {
        let text = render_leaderboards(&boards(), false).unwrap();
        assert_eq!(text, "   1  Office\n  12  Chess club\n");
        assert_eq!(render_leaderboards(&[], false).unwrap(), "");
    }

    #[test]
    fn test_render_leaderboards_json() {
        let json = render_leaderboards(&boards(), true).unwrap();
        let parsed: Vec<Leaderboard> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, boards());
    }
}
