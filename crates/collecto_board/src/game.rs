//! A match: one board shared by two participants.

use crate::board::Board;
use crate::score::Collected;
use crate::types::{Command, Turn};
use derive_more::Display;
use std::cmp::Ordering;
use tracing::{debug, info, instrument, warn};

/// Identity of a participant (their login name).
pub type ParticipantId = String;

/// Current result of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Moves remain.
    InProgress,
    /// No moves remain and both scores are equal.
    Draw,
    /// No moves remain and this participant scored higher.
    Win(ParticipantId),
}

/// Error applying a move to a match.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MoveError {
    /// The submitter is not one of the two participants.
    #[display("{} is not playing in this match", _0)]
    NotAParticipant(ParticipantId),
    /// The match has already ended.
    #[display("Match is already over")]
    GameOver,
    /// Single move that creates no adjacency or moves nothing.
    #[display("Move {} is not a valid single move", _0)]
    IllegalSingleMove(Command),
    /// Double move that is not allowed on this board.
    #[display("Moves {} and {} are not a valid double move", _0, _1)]
    IllegalDoubleMove(Command, Command),
}

impl std::error::Error for MoveError {}

/// Two participants playing on one board.
#[derive(Debug, Clone)]
pub struct Match {
    board: Board,
    participants: [ParticipantId; 2],
    collected: [Collected; 2],
    over: bool,
}

impl Match {
    /// Creates a match. `first` is listed first wherever the pair is reported.
    #[instrument(skip(board))]
    pub fn new(first: ParticipantId, second: ParticipantId, board: Board) -> Self {
        let over = board.game_over();
        info!(%first, %second, over, "Creating match");
        Self {
            board,
            participants: [first, second],
            collected: [Collected::new(), Collected::new()],
            over,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns both participants in the order given at creation.
    pub fn participants(&self) -> &[ParticipantId; 2] {
        &self.participants
    }

    /// Seat (0 or 1) of a participant.
    pub fn seat(&self, participant: &str) -> Option<usize> {
        self.participants.iter().position(|p| p == participant)
    }

    /// Checks if `participant` plays in this match.
    pub fn has_participant(&self, participant: &str) -> bool {
        self.seat(participant).is_some()
    }

    /// The other participant.
    pub fn opponent_of(&self, participant: &str) -> Option<&ParticipantId> {
        self.seat(participant)
            .map(|seat| &self.participants[1 - seat])
    }

    /// Tiles collected so far by a participant.
    pub fn collected(&self, participant: &str) -> Option<&Collected> {
        self.seat(participant).map(|seat| &self.collected[seat])
    }

    /// Score of a participant.
    pub fn score(&self, participant: &str) -> Option<u32> {
        self.collected(participant).map(Collected::score)
    }

    /// Checks if no move is left on the board.
    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Plays a single move for `participant`.
    ///
    /// # Errors
    ///
    /// Fails without touching the board when the participant is unknown, the
    /// match is over, or the move is not valid.
    #[instrument(skip(self), fields(participant = %participant, command = %command))]
    pub fn apply_single_move(
        &mut self,
        participant: &str,
        command: Command,
    ) -> Result<Collected, MoveError> {
        self.apply_turn(participant, Turn::Single(command))
    }

    /// Plays a double move for `participant`: both slides, then one removal.
    ///
    /// # Errors
    ///
    /// Same as [`Match::apply_single_move`].
    #[instrument(skip(self), fields(participant = %participant))]
    pub fn apply_double_move(
        &mut self,
        participant: &str,
        first: Command,
        second: Command,
    ) -> Result<Collected, MoveError> {
        self.apply_turn(participant, Turn::Double(first, second))
    }

    /// Plays a validated turn, credits the removed tiles to the mover and
    /// re-evaluates whether the match is over.
    #[instrument(skip(self), fields(participant = %participant, turn = %turn))]
    pub fn apply_turn(&mut self, participant: &str, turn: Turn) -> Result<Collected, MoveError> {
        let seat = self.seat(participant).ok_or_else(|| {
            warn!("Move from unknown participant");
            MoveError::NotAParticipant(participant.to_string())
        })?;

        if self.over {
            return Err(MoveError::GameOver);
        }

        if !self.board.turn_valid(turn) {
            return Err(match turn {
                Turn::Single(command) => MoveError::IllegalSingleMove(command),
                Turn::Double(first, second) => MoveError::IllegalDoubleMove(first, second),
            });
        }

        let removed = self.board.apply_turn(turn);
        self.collected[seat].merge(&removed);
        self.over = self.board.game_over();

        debug!(
            removed = removed.total(),
            score = self.collected[seat].score(),
            over = self.over,
            "Turn applied"
        );
        Ok(removed)
    }

    /// Win, draw, or still in progress.
    pub fn outcome(&self) -> Outcome {
        if !self.over {
            return Outcome::InProgress;
        }
        let [first, second] = [self.collected[0].score(), self.collected[1].score()];
        match first.cmp(&second) {
            Ordering::Equal => Outcome::Draw,
            Ordering::Greater => Outcome::Win(self.participants[0].clone()),
            Ordering::Less => Outcome::Win(self.participants[1].clone()),
        }
    }
}
