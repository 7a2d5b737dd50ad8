//! Server and client configuration.

use crate::players::PlayerKind;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Port used when neither config nor command line names one.
pub const DEFAULT_PORT: u16 = 4114;

/// Settings for a Collecto server.
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,

    /// Name announced in the `HELLO` reply.
    #[serde(default = "default_server_name")]
    server_name: String,

    /// Board generation attempts before a pairing is abandoned.
    #[serde(default = "default_max_board_attempts")]
    max_board_attempts: usize,

    /// Seed for board generation. Random when absent.
    #[serde(default)]
    seed: Option<u64>,
}

#[instrument]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[instrument]
fn default_port() -> u16 {
    DEFAULT_PORT
}

#[instrument]
fn default_server_name() -> String {
    "Collecto server".to_string()
}

#[instrument]
fn default_max_board_attempts() -> usize {
    1_000_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            server_name: default_server_name(),
            max_board_attempts: default_max_board_attempts(),
            seed: None,
        }
    }
}

/// Reads and deserializes a TOML file.
#[instrument(skip(path), fields(path = %path.display()))]
fn load<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    debug!("Loading config from file");
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

    toml::from_str(&content)
        .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = load(path.as_ref())?;

        if config.max_board_attempts == 0 {
            return Err(ConfigError::new(
                "max_board_attempts must be at least 1".to_string(),
            ));
        }

        info!(
            server_name = %config.server_name,
            host = %config.host,
            port = config.port,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Socket address string for binding.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings for a client session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct ClientConfig {
    /// Login name.
    name: String,

    /// Server host.
    #[serde(default = "default_host")]
    host: String,

    /// Server port.
    #[serde(default = "default_port")]
    port: u16,

    /// Who picks the moves.
    #[serde(default = "default_player")]
    player: PlayerKind,

    /// Matches to play before disconnecting.
    #[serde(default = "default_matches")]
    matches: u32,
}

#[instrument]
fn default_player() -> PlayerKind {
    PlayerKind::Human
}

#[instrument]
fn default_matches() -> u32 {
    1
}

impl ClientConfig {
    /// Creates a client configuration with defaults for everything but the name.
    #[instrument(skip(name), fields(name = %name))]
    pub fn new(name: String) -> Self {
        Self {
            name,
            host: default_host(),
            port: default_port(),
            player: default_player(),
            matches: default_matches(),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = load(path.as_ref())?;
        if config.name.trim().is_empty() {
            return Err(ConfigError::new("name must not be empty".to_string()));
        }
        info!(name = %config.name, player = %config.player, "Config loaded successfully");
        Ok(config)
    }

    /// Server address to connect to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
