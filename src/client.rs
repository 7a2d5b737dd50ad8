//! Network client: logs in, queues and plays matches with a [`MoveStrategy`].

use crate::protocol::{GameResult, ProtocolError, Request, Response};
use collecto_board::{Board, Collected, MoveStrategy, ParticipantId, Turn};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, info, instrument, warn};

/// Description sent in the handshake.
pub const CLIENT_DESCRIPTION: &str = "collecto-rs client";

/// Consecutive rejected moves tolerated before giving up on a match.
const MAX_REJECTIONS: usize = 3;

/// Client error.
#[derive(Debug, Clone, Display, Error)]
#[display("Client error: {} at {}:{}", message, file, line)]
pub struct ClientError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ClientError {
    /// Creates a new client error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for ClientError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("Connection failed: {err}"))
    }
}

impl From<ProtocolError> for ClientError {
    #[track_caller]
    fn from(err: ProtocolError) -> Self {
        Self::new(format!("Malformed server message: {err}"))
    }
}

/// How one match went from the client's side.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct MatchReport {
    /// Who we played.
    opponent: ParticipantId,
    /// Whether we moved first.
    moved_first: bool,
    /// Final result as announced by the server.
    result: GameResult,
    /// Our score on the mirrored board.
    score: u32,
    /// The opponent's score on the mirrored board.
    opponent_score: u32,
    /// Turns played by both sides.
    turns: usize,
}

/// Connection to a Collecto server under one login name.
#[derive(Debug)]
pub struct GameClient {
    name: ParticipantId,
    server_name: String,
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl GameClient {
    /// Connects, performs the handshake and logs in as `name`.
    #[instrument]
    pub async fn connect(address: &str, name: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(address)
            .await
            .map_err(|e| ClientError::new(format!("Failed to connect to {address}: {e}")))?;
        let (reader, writer) = stream.into_split();
        let mut client = Self {
            name: name.to_string(),
            server_name: String::new(),
            lines: BufReader::new(reader).lines(),
            writer,
        };

        client
            .send(&Request::Hello(CLIENT_DESCRIPTION.to_string()))
            .await?;
        match client.receive().await? {
            Response::Hello(server_name) => client.server_name = server_name,
            other => return Err(ClientError::new(format!("Expected HELLO, got {other}"))),
        }

        client.send(&Request::Login(name.to_string())).await?;
        match client.receive().await? {
            Response::Login => {}
            Response::AlreadyLoggedIn => {
                return Err(ClientError::new(format!("Name {name} is already taken")));
            }
            other => return Err(ClientError::new(format!("Expected LOGIN, got {other}"))),
        }

        info!(server = %client.server_name, "Logged in");
        Ok(client)
    }

    /// Login name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name the server announced.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Sends one request line.
    pub async fn send(&mut self, request: &Request) -> Result<(), ClientError> {
        debug!(%request, "Sending");
        let line = format!("{request}\n");
        self.writer.write_all(line.as_bytes()).await?;
        Ok(())
    }

    /// Waits for the next server message.
    pub async fn receive(&mut self) -> Result<Response, ClientError> {
        let line = self
            .lines
            .next_line()
            .await?
            .ok_or_else(|| ClientError::new("Server closed the connection"))?;
        let response = line.parse::<Response>()?;
        debug!(%response, "Received");
        Ok(response)
    }

    /// Participants currently logged in. Only meaningful outside a match.
    pub async fn list(&mut self) -> Result<Vec<ParticipantId>, ClientError> {
        self.send(&Request::List).await?;
        loop {
            match self.receive().await? {
                Response::List(names) => return Ok(names),
                other => debug!(%other, "Ignoring message while waiting for LIST"),
            }
        }
    }

    /// Queues, waits for an opponent, and plays the match to the end.
    ///
    /// The board is mirrored locally from `NEWGAME` and every `MOVE`
    /// broadcast, so the strategy always sees the server's board. On a
    /// multi-threaded runtime the strategy runs under `block_in_place`;
    /// on a current-thread runtime it runs inline.
    #[instrument(skip(self, strategy), fields(name = %self.name, strategy = strategy.name()))]
    pub async fn play_match(
        &mut self,
        strategy: &mut dyn MoveStrategy,
    ) -> Result<MatchReport, ClientError> {
        self.send(&Request::Queue).await?;
        let (mut board, first, second) = loop {
            match self.receive().await? {
                Response::NewGame {
                    board,
                    first,
                    second,
                } => break (board, first, second),
                Response::Error(reason) => {
                    return Err(ClientError::new(format!("Queueing failed: {reason}")));
                }
                other => debug!(%other, "Ignoring message while queued"),
            }
        };

        let moved_first = first == self.name;
        let opponent = if moved_first { second } else { first };
        info!(%opponent, moved_first, "Match started");

        let mut my_turn = moved_first;
        let mut awaiting_reply = false;
        let mut rejections = 0;
        let mut mine = Collected::new();
        let mut theirs = Collected::new();
        let mut turns = 0;

        loop {
            // A board without moves is followed by GAMEOVER, not a turn.
            if my_turn && !awaiting_reply && !board.game_over() {
                let turn = choose(strategy, &board)
                    .ok_or_else(|| ClientError::new("Strategy produced no move"))?;
                self.send(&Request::Move(turn)).await?;
                awaiting_reply = true;
            }

            match self.receive().await? {
                Response::Move(turn) => {
                    let removed = board.apply_turn(turn);
                    if my_turn {
                        mine.merge(&removed);
                    } else {
                        theirs.merge(&removed);
                    }
                    my_turn = !my_turn;
                    awaiting_reply = false;
                    rejections = 0;
                    turns += 1;
                }
                Response::GameOver(result) => {
                    info!(?result, score = mine.score(), "Match over");
                    return Ok(MatchReport::new(
                        opponent,
                        moved_first,
                        result,
                        mine.score(),
                        theirs.score(),
                        turns,
                    ));
                }
                Response::Error(reason) if awaiting_reply => {
                    rejections += 1;
                    warn!(%reason, rejections, "Move rejected");
                    if rejections >= MAX_REJECTIONS {
                        return Err(ClientError::new(format!(
                            "Server rejected {rejections} moves in a row: {reason}"
                        )));
                    }
                    awaiting_reply = false;
                }
                other => warn!(%other, "Unexpected message during match"),
            }
        }
    }
}

/// Asks the strategy without stalling other tasks on this worker.
///
/// A current-thread runtime has no other worker to hand tasks to, so the
/// strategy runs inline there.
fn choose(strategy: &mut dyn MoveStrategy, board: &Board) -> Option<Turn> {
    match Handle::current().runtime_flavor() {
        RuntimeFlavor::MultiThread => tokio::task::block_in_place(|| strategy.choose_turn(board)),
        _ => strategy.choose_turn(board),
    }
}
