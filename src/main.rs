//! Collecto - unified CLI
//!
//! Runs the game server, or a client that plays matches on one.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use collecto::{ClientConfig, GameClient, GameServer, ServerConfig};
use std::path::PathBuf;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the human prompt.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Server {
            config,
            host,
            port,
            seed,
        } => run_server(config, host, port, seed).await,
        Command::Client {
            config,
            host,
            port,
            name,
            player,
            matches,
        } => {
            let mut settings = match (config, name) {
                (Some(path), name) => {
                    let settings = ClientConfig::from_file(&path)
                        .with_context(|| format!("Loading {}", path.display()))?;
                    match name {
                        Some(name) => settings.with_name(name),
                        None => settings,
                    }
                }
                (None, Some(name)) => ClientConfig::new(name),
                (None, None) => bail!("--name is required without --config"),
            };
            if let Some(host) = host {
                settings = settings.with_host(host);
            }
            if let Some(port) = port {
                settings = settings.with_port(port);
            }
            if let Some(player) = player {
                settings = settings.with_player(player);
            }
            if let Some(matches) = matches {
                settings = settings.with_matches(matches);
            }
            run_client(settings).await
        }
    }
}

/// Run the game server
#[instrument]
async fn run_server(
    config: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    seed: Option<u64>,
) -> Result<()> {
    let mut settings = match config {
        Some(path) => ServerConfig::from_file(&path)
            .with_context(|| format!("Loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(host) = host {
        settings = settings.with_host(host);
    }
    if let Some(port) = port {
        settings = settings.with_port(port);
    }
    if let Some(seed) = seed {
        settings = settings.with_seed(seed);
    }

    info!(address = %settings.address(), "Starting Collecto server");
    GameServer::new(settings)
        .run()
        .await
        .context("Server stopped")
}

/// Run a client that plays the configured number of matches in a row
#[instrument(skip(settings), fields(name = %settings.name()))]
async fn run_client(settings: ClientConfig) -> Result<()> {
    let name = settings.name().clone();
    let mut client = GameClient::connect(&settings.address(), &name).await?;
    println!("Connected to {} as {}", client.server_name(), name);

    let mut strategy = settings.player().build(&name);
    for round in 1..=*settings.matches() {
        let report = client.play_match(strategy.as_mut()).await?;
        let verdict = match report.result().winner() {
            None => "draw".to_string(),
            Some(winner) if winner == name => "won".to_string(),
            Some(winner) => format!("lost to {winner}"),
        };
        println!(
            "Match {round} against {}: {verdict} ({} - {})",
            report.opponent(),
            report.score(),
            report.opponent_score()
        );
    }

    if *settings.matches() == 0 {
        warn!("Nothing to play");
    }
    Ok(())
}
