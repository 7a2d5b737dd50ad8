//! Collecto networking: the game server, its session coordinator and a client.
//!
//! The rules live in [`collecto_board`]; this crate puts two participants on
//! one board over a line-based TCP protocol.
//!
//! # Architecture
//!
//! - **Protocol**: `~`-delimited request and response lines
//! - **Session**: login, queue, pairing and move arbitration
//! - **Server**: one task per connection plus a writer task draining its outbox
//! - **Client**: mirrors the board and asks a [`MoveStrategy`] for moves
//!
//! # Example
//!
//! ```no_run
//! use collecto::{GameClient, GameServer, ServerConfig};
//! use collecto_board::GreedyStrategy;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let server = GameServer::new(ServerConfig::default().with_port(0u16));
//! let listener = server.bind().await?;
//! let address = listener.local_addr()?.to_string();
//! tokio::spawn(server.serve(listener));
//!
//! let mut client = GameClient::connect(&address, "ada").await?;
//! let report = client.play_match(&mut GreedyStrategy::new("ada")).await?;
//! println!("{:?}", report.result());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod config;
mod connection;
mod protocol;
mod server;
mod session;

pub mod players;

pub use client::{CLIENT_DESCRIPTION, ClientError, GameClient, MatchReport};
pub use collecto_board::MoveStrategy;
pub use config::{ClientConfig, ConfigError, DEFAULT_PORT, ServerConfig};
pub use connection::{Connection, serve_connection};
pub use protocol::{DELIMITER, GameResult, Keyword, ProtocolError, Request, Response};
pub use server::GameServer;
pub use session::{Outbox, ParticipantState, SessionCoordinator, SessionError};
