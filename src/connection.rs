//! One client connection: parses requests and routes them to the coordinator.

use crate::protocol::{Request, Response};
use crate::session::{Outbox, SessionCoordinator, SessionError};
use collecto_board::ParticipantId;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Request handling state of a single connection.
#[derive(Debug)]
pub struct Connection {
    identity: Option<ParticipantId>,
    outbox: Outbox,
}

impl Connection {
    /// Creates a connection whose replies go to `outbox`.
    pub fn new(outbox: Outbox) -> Self {
        Self {
            identity: None,
            outbox,
        }
    }

    /// Name this connection logged in with.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    fn reply(&self, response: Response) {
        if self.outbox.send(response).is_err() {
            debug!("Reply dropped, writer closed");
        }
    }

    fn reject(&self, err: impl std::fmt::Display) {
        self.reply(Response::Error(err.to_string()));
    }

    /// Parses one line and handles it. Malformed lines get an `ERROR` reply.
    #[instrument(skip(self, coordinator), fields(identity = ?self.identity))]
    pub async fn handle_line(&mut self, coordinator: &SessionCoordinator, line: &str) {
        match line.parse::<Request>() {
            Ok(request) => self.handle(coordinator, request).await,
            Err(err) => {
                warn!(error = %err, "Malformed request");
                self.reject(err);
            }
        }
    }

    /// Handles a parsed request.
    pub async fn handle(&mut self, coordinator: &SessionCoordinator, request: Request) {
        debug!(%request, "Handling request");
        match request {
            Request::Hello(description) => {
                info!(client = %description, "Handshake");
                self.reply(coordinator.hello());
            }
            Request::Login(name) => {
                if let Some(current) = &self.identity {
                    self.reject(format!("Already logged in as {current}"));
                    return;
                }
                let response = coordinator.login(&name, self.outbox.clone()).await;
                if response == Response::Login {
                    self.identity = Some(name);
                }
                self.reply(response);
            }
            Request::List => self.reply(coordinator.list().await),
            Request::Queue => {
                let Some(identity) = self.identity.as_deref() else {
                    self.reject(SessionError::NotLoggedIn);
                    return;
                };
                if let Err(err) = coordinator.queue(identity).await {
                    self.reject(err);
                }
            }
            Request::Move(turn) => {
                let Some(identity) = self.identity.as_deref() else {
                    self.reject(SessionError::NotLoggedIn);
                    return;
                };
                if let Err(err) = coordinator.submit_move(identity, turn).await {
                    warn!(error = %err, "Move rejected");
                    self.reject(err);
                }
            }
        }
    }

    /// Releases everything the coordinator holds for this connection.
    pub async fn close(self, coordinator: &SessionCoordinator) {
        if let Some(identity) = self.identity {
            coordinator.disconnect(&identity).await;
        }
    }
}

/// Serves one TCP client until it disconnects.
///
/// Replies and notifications are written by a separate task draining the
/// connection's outbox, so a slow reader never blocks the coordinator.
#[instrument(skip(stream, coordinator), fields(peer = tracing::field::Empty))]
pub async fn serve_connection(
    stream: TcpStream,
    coordinator: SessionCoordinator,
) -> std::io::Result<()> {
    let peer = stream.peer_addr()?;
    tracing::Span::current().record("peer", tracing::field::display(peer));
    info!("Client connected");

    let (reader, writer) = stream.into_split();
    let (outbox, inbox) = mpsc::unbounded_channel();
    tokio::spawn(write_responses(writer, inbox));

    let mut connection = Connection::new(outbox);
    let mut lines = BufReader::new(reader).lines();
    let result = loop {
        match lines.next_line().await {
            Ok(Some(line)) => connection.handle_line(&coordinator, &line).await,
            Ok(None) => break Ok(()),
            Err(err) => break Err(err),
        }
    };

    info!(identity = ?connection.identity(), "Client disconnected");
    connection.close(&coordinator).await;
    result
}

/// Writes every queued response as one line until all senders are gone or
/// the socket fails.
async fn write_responses(
    mut writer: OwnedWriteHalf,
    mut inbox: mpsc::UnboundedReceiver<Response>,
) {
    while let Some(response) = inbox.recv().await {
        let line = format!("{response}\n");
        if let Err(err) = writer.write_all(line.as_bytes()).await {
            warn!(error = %err, "Write failed, dropping connection output");
            return;
        }
    }
    let _ = writer.shutdown().await;
}
