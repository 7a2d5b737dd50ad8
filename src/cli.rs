//! Command-line interface for collecto.

use collecto::players::PlayerKind;
use clap::{Parser, Subcommand};

/// Collecto - two-player tile-sliding game over TCP
#[derive(Parser, Debug)]
#[command(name = "collecto")]
#[command(about = "Collecto game server and client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Server {
        /// Path to a TOML server config; defaults apply without one
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Seed for board generation (overrides the config file)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Connect to a server and play
    Client {
        /// Path to a TOML client config
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Server host
        #[arg(long)]
        host: Option<String>,

        /// Server port
        #[arg(short, long)]
        port: Option<u16>,

        /// Login name (required without a config file)
        #[arg(short, long)]
        name: Option<String>,

        /// Who picks the moves
        #[arg(long, value_enum)]
        player: Option<PlayerKind>,

        /// Matches to play before disconnecting
        #[arg(short, long)]
        matches: Option<u32>,
    },
}
