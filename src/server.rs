//! TCP server: accepts connections and hands each one its own task.

use crate::config::ServerConfig;
use crate::connection::serve_connection;
use crate::session::SessionCoordinator;
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};

/// Collecto game server.
#[derive(Debug, Clone)]
pub struct GameServer {
    config: ServerConfig,
    coordinator: SessionCoordinator,
}

impl GameServer {
    /// Creates a server with a coordinator built from `config`.
    #[instrument(skip(config), fields(address = %config.address()))]
    pub fn new(config: ServerConfig) -> Self {
        info!("Creating game server");
        let coordinator = SessionCoordinator::from_config(&config);
        Self {
            config,
            coordinator,
        }
    }

    /// Settings the server was created with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Shared coordinator of every connection.
    pub fn coordinator(&self) -> &SessionCoordinator {
        &self.coordinator
    }

    /// Binds the configured address.
    #[instrument(skip(self), fields(address = %self.config.address()))]
    pub async fn bind(&self) -> std::io::Result<TcpListener> {
        let listener = TcpListener::bind(self.config.address()).await?;
        info!(local = %listener.local_addr()?, "Listening");
        Ok(listener)
    }

    /// Binds and serves until the process stops.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await;
        Ok(())
    }

    /// Accepts connections on `listener` forever.
    #[instrument(skip(self, listener))]
    pub async fn serve(self, listener: TcpListener) {
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    warn!(error = %err, "Accept failed");
                    continue;
                }
            };
            let coordinator = self.coordinator.clone();
            tokio::spawn(async move {
                if let Err(err) = serve_connection(stream, coordinator).await {
                    error!(%peer, error = %err, "Connection ended with an error");
                }
            });
        }
    }
}
