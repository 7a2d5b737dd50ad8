//! Match sessions: login, queueing, pairing and move arbitration.
//!
//! The [`SessionCoordinator`] is the single authority for every running
//! match. The registry lock and a match lock are never held at the same
//! time: the registry is consulted to find a match, released, and the match
//! is then locked on its own.

use crate::config::ServerConfig;
use crate::protocol::{GameResult, Response};
use collecto_board::{Board, GenerationError, Match, MoveError, Outcome, ParticipantId, Turn};
use derive_more::Display;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};

/// Outgoing message channel of one connection.
///
/// A failed send means the peer is gone.
pub type Outbox = mpsc::UnboundedSender<Response>;

/// Where a logged-in participant currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ParticipantState {
    /// Logged in, neither queued nor playing.
    Idle,
    /// Waiting for an opponent.
    Queued,
    /// Playing a match.
    Matched,
}

/// Reasons the coordinator rejects a request.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SessionError {
    /// The request needs a logged-in participant.
    #[display("Log in first")]
    NotLoggedIn,
    /// The name is unknown to the coordinator.
    #[display("{} is not logged in", _0)]
    UnknownParticipant(ParticipantId),
    /// The participant already plays a match.
    #[display("{} is already in a match", _0)]
    AlreadyInMatch(ParticipantId),
    /// Move request outside of a match.
    #[display("Not in a match")]
    NotInMatch,
    /// Move request while the opponent is to move.
    #[display("Not your turn")]
    NotYourTurn,
    /// The match rejected the move.
    #[display("{}", _0)]
    IllegalMove(MoveError),
    /// No board could be generated for a pairing.
    #[display("{}", _0)]
    Generation(GenerationError),
}

impl std::error::Error for SessionError {}

impl From<MoveError> for SessionError {
    fn from(err: MoveError) -> Self {
        SessionError::IllegalMove(err)
    }
}

impl From<GenerationError> for SessionError {
    fn from(err: GenerationError) -> Self {
        SessionError::Generation(err)
    }
}

/// A running match and the channels of its two participants.
#[derive(Debug)]
struct ActiveMatch {
    game: Match,
    outboxes: [Outbox; 2],
    to_move: usize,
    closed: bool,
}

type SharedMatch = Arc<Mutex<ActiveMatch>>;

impl ActiveMatch {
    /// Sends to both seats. Returns the first seat that could not be reached.
    fn broadcast(&self, response: &Response) -> Option<usize> {
        let mut unreachable = None;
        for (seat, outbox) in self.outboxes.iter().enumerate() {
            if outbox.send(response.clone()).is_err() {
                unreachable.get_or_insert(seat);
            }
        }
        unreachable
    }

    /// Ends the match, awarding the win to the seat opposite `loser`.
    fn forfeit(&mut self, loser: usize) {
        self.closed = true;
        let winner = self.game.participants()[1 - loser].clone();
        info!(%winner, loser = %self.game.participants()[loser], "Match forfeited");
        // The winner may be gone as well; nothing is left to tell then.
        let _ = self.outboxes[1 - loser].send(Response::GameOver(GameResult::Disconnect(winner)));
    }

    /// Validates and plays a turn, then notifies both seats.
    ///
    /// Returns `true` when the match has ended.
    fn play(&mut self, participant: &str, turn: Turn) -> Result<bool, SessionError> {
        if self.closed {
            return Err(SessionError::NotInMatch);
        }
        let seat = self.game.seat(participant).ok_or(SessionError::NotInMatch)?;
        if seat != self.to_move {
            warn!(participant, "Move out of turn");
            return Err(SessionError::NotYourTurn);
        }

        self.game.apply_turn(participant, turn)?;
        self.to_move = 1 - seat;

        if let Some(unreachable) = self.broadcast(&Response::Move(turn)) {
            self.forfeit(unreachable);
            return Ok(true);
        }

        Ok(self.conclude())
    }

    /// Announces the result and closes the match once no move is left.
    ///
    /// Returns `true` when the match has ended.
    fn conclude(&mut self) -> bool {
        let result = match self.game.outcome() {
            Outcome::InProgress => return false,
            Outcome::Draw => GameResult::Draw,
            Outcome::Win(winner) => GameResult::Victory(winner),
        };
        info!(?result, "Match finished");
        // A seat that misses the final result has nothing to forfeit.
        if let Some(unreachable) = self.broadcast(&Response::GameOver(result)) {
            debug!(seat = unreachable, "Final result undeliverable");
        }
        self.closed = true;
        true
    }
}

#[derive(Debug)]
struct Registry {
    outboxes: HashMap<ParticipantId, Outbox>,
    queue: VecDeque<ParticipantId>,
    matches: HashMap<ParticipantId, SharedMatch>,
    rng: StdRng,
}

impl Registry {
    fn state(&self, participant: &str) -> Option<ParticipantState> {
        if !self.outboxes.contains_key(participant) {
            None
        } else if self.matches.contains_key(participant) {
            Some(ParticipantState::Matched)
        } else if self.queue.iter().any(|p| p == participant) {
            Some(ParticipantState::Queued)
        } else {
            Some(ParticipantState::Idle)
        }
    }

    fn outbox(&self, participant: &str) -> Result<Outbox, SessionError> {
        self.outboxes
            .get(participant)
            .cloned()
            .ok_or_else(|| SessionError::UnknownParticipant(participant.to_string()))
    }

    /// Creates a match, announces it, and records both participants.
    ///
    /// A board without any legal move ends the match right after `NEWGAME`,
    /// so nothing is recorded.
    fn start_match(
        &mut self,
        first: &str,
        second: &str,
        board: Board,
    ) -> Result<(), SessionError> {
        let outboxes = [self.outbox(first)?, self.outbox(second)?];
        for participant in [first, second] {
            if self.matches.contains_key(participant) {
                return Err(SessionError::AlreadyInMatch(participant.to_string()));
            }
        }
        self.queue.retain(|p| p != first && p != second);

        let mut active = ActiveMatch {
            game: Match::new(first.to_string(), second.to_string(), board),
            outboxes,
            to_move: 0,
            closed: false,
        };

        let announcement = Response::NewGame {
            board,
            first: first.to_string(),
            second: second.to_string(),
        };
        if let Some(unreachable) = active.broadcast(&announcement) {
            active.forfeit(unreachable);
            return Ok(());
        }
        if active.conclude() {
            return Ok(());
        }

        let shared = Arc::new(Mutex::new(active));
        self.matches.insert(first.to_string(), Arc::clone(&shared));
        self.matches.insert(second.to_string(), shared);
        Ok(())
    }

    /// Drops the registry's references to a finished match.
    fn retire(&mut self, participants: &[ParticipantId; 2], finished: &SharedMatch) {
        for participant in participants {
            if self
                .matches
                .get(participant)
                .is_some_and(|current| Arc::ptr_eq(current, finished))
            {
                self.matches.remove(participant);
            }
        }
    }
}

/// Server-side authority over logins, the queue and all running matches.
#[derive(Debug, Clone)]
pub struct SessionCoordinator {
    server_name: String,
    max_board_attempts: usize,
    registry: Arc<Mutex<Registry>>,
}

impl SessionCoordinator {
    /// Creates a coordinator with an entropy-seeded board generator.
    #[instrument(skip(server_name), fields(server_name = %server_name.as_ref()))]
    pub fn new(server_name: impl AsRef<str>) -> Self {
        let attempts = *ServerConfig::default().max_board_attempts();
        Self::with_rng(server_name.as_ref(), attempts, StdRng::from_entropy())
    }

    /// Creates a coordinator from server settings.
    #[instrument(skip(config), fields(server_name = %config.server_name()))]
    pub fn from_config(config: &ServerConfig) -> Self {
        let rng = match config.seed() {
            Some(seed) => StdRng::seed_from_u64(*seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config.server_name(), *config.max_board_attempts(), rng)
    }

    fn with_rng(server_name: &str, max_board_attempts: usize, rng: StdRng) -> Self {
        info!(server_name, max_board_attempts, "Creating session coordinator");
        Self {
            server_name: server_name.to_string(),
            max_board_attempts,
            registry: Arc::new(Mutex::new(Registry {
                outboxes: HashMap::new(),
                queue: VecDeque::new(),
                matches: HashMap::new(),
                rng,
            })),
        }
    }

    /// Name announced in the handshake.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Board generation attempts before a pairing is abandoned.
    pub fn max_board_attempts(&self) -> usize {
        self.max_board_attempts
    }

    /// Handshake reply.
    pub fn hello(&self) -> Response {
        Response::Hello(self.server_name.clone())
    }

    /// Registers `name` with the channel its notifications go to.
    ///
    /// Replies `LOGIN`, or `ALREADYLOGGEDIN` when the name is taken.
    #[instrument(skip(self, outbox))]
    pub async fn login(&self, name: &str, outbox: Outbox) -> Response {
        let mut registry = self.registry.lock().await;
        if registry.outboxes.contains_key(name) {
            warn!("Name already in use");
            return Response::AlreadyLoggedIn;
        }
        registry.outboxes.insert(name.to_string(), outbox);
        info!(online = registry.outboxes.len(), "Participant logged in");
        Response::Login
    }

    /// Names of everyone logged in, sorted.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Response {
        let registry = self.registry.lock().await;
        let mut names: Vec<ParticipantId> = registry.outboxes.keys().cloned().collect();
        names.sort();
        debug!(count = names.len(), "Listed participants");
        Response::List(names)
    }

    /// Toggles queue membership, pairing the two longest waiting participants
    /// as soon as there are two.
    ///
    /// The longest waiting participant moves first. Returns the state of
    /// `participant` after the request.
    #[instrument(skip(self))]
    pub async fn queue(&self, participant: &str) -> Result<ParticipantState, SessionError> {
        let mut registry = self.registry.lock().await;
        match registry.state(participant) {
            None => return Err(SessionError::UnknownParticipant(participant.to_string())),
            Some(ParticipantState::Matched) => {
                return Err(SessionError::AlreadyInMatch(participant.to_string()));
            }
            Some(ParticipantState::Queued) => {
                registry.queue.retain(|p| p != participant);
                info!("Left queue");
                return Ok(ParticipantState::Idle);
            }
            Some(ParticipantState::Idle) => {
                registry.queue.push_back(participant.to_string());
                info!(waiting = registry.queue.len(), "Joined queue");
            }
        }

        if registry.queue.len() >= 2 {
            let (Some(first), Some(second)) = (registry.queue.pop_front(), registry.queue.pop_front())
            else {
                return Ok(ParticipantState::Queued);
            };
            let max_attempts = self.max_board_attempts;
            match Board::generate_bounded(&mut registry.rng, max_attempts) {
                Ok(board) => registry.start_match(&first, &second, board)?,
                Err(err) => {
                    warn!(error = %err, %first, %second, "Pairing abandoned");
                    for name in [&first, &second] {
                        if let Ok(outbox) = registry.outbox(name) {
                            let _ = outbox.send(Response::Error(err.to_string()));
                        }
                    }
                }
            }
        }

        Ok(registry
            .state(participant)
            .unwrap_or(ParticipantState::Idle))
    }

    /// Starts a match on a given board, bypassing the queue.
    ///
    /// `first` moves first. Both participants must be logged in and idle or
    /// queued.
    #[instrument(skip(self, board))]
    pub async fn start_match(
        &self,
        first: &str,
        second: &str,
        board: Board,
    ) -> Result<(), SessionError> {
        let mut registry = self.registry.lock().await;
        registry.start_match(first, second, board)
    }

    /// Plays a turn for `participant` and broadcasts the result.
    ///
    /// Rejections leave the match untouched; the caller reports them to the
    /// submitter only.
    #[instrument(skip(self), fields(participant = %participant, turn = %turn))]
    pub async fn submit_move(&self, participant: &str, turn: Turn) -> Result<(), SessionError> {
        let shared = {
            let registry = self.registry.lock().await;
            if !registry.outboxes.contains_key(participant) {
                return Err(SessionError::NotLoggedIn);
            }
            registry
                .matches
                .get(participant)
                .cloned()
                .ok_or(SessionError::NotInMatch)?
        };

        let finished = {
            let mut active = shared.lock().await;
            if active.play(participant, turn)? {
                Some(active.game.participants().clone())
            } else {
                None
            }
        };

        if let Some(participants) = finished {
            self.registry.lock().await.retire(&participants, &shared);
        }
        Ok(())
    }

    /// Forgets a participant whose connection ended.
    ///
    /// A running match is forfeited to the opponent.
    #[instrument(skip(self))]
    pub async fn disconnect(&self, participant: &str) {
        let shared = {
            let mut registry = self.registry.lock().await;
            registry.outboxes.remove(participant);
            registry.queue.retain(|p| p != participant);
            registry.matches.remove(participant)
        };
        info!("Participant disconnected");

        let Some(shared) = shared else {
            return;
        };
        let forfeited = {
            let mut active = shared.lock().await;
            match active.game.seat(participant) {
                Some(seat) if !active.closed => {
                    active.forfeit(seat);
                    Some(active.game.participants().clone())
                }
                _ => None,
            }
        };
        if let Some(participants) = forfeited {
            self.registry.lock().await.retire(&participants, &shared);
        }
    }

    /// Lifecycle state of a participant, `None` if not logged in.
    pub async fn state(&self, participant: &str) -> Option<ParticipantState> {
        self.registry.lock().await.state(participant)
    }

    /// Participants waiting in the queue, longest waiting first.
    pub async fn queued(&self) -> Vec<ParticipantId> {
        self.registry.lock().await.queue.iter().cloned().collect()
    }

    /// Number of matches in progress.
    pub async fn active_matches(&self) -> usize {
        self.registry.lock().await.matches.len() / 2
    }

    /// Snapshot of the match `participant` plays in.
    pub async fn match_of(&self, participant: &str) -> Option<Match> {
        let shared = self.registry.lock().await.matches.get(participant).cloned()?;
        let active = shared.lock().await;
        Some(active.game.clone())
    }
}
