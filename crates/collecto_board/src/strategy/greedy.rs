//! Greedy strategy: maximise tiles removed this turn.

use super::MoveStrategy;
use crate::board::Board;
use crate::types::{Command, Turn};
use tracing::debug;

/// Picks the move that leaves the most adjacent tiles.
///
/// Ties go to the first candidate in command order.
pub struct GreedyStrategy {
    name: String,
}

impl GreedyStrategy {
    /// Creates a greedy strategy.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Number of tiles a turn would remove from `board`.
    fn yield_of(board: &Board, turn: Turn) -> usize {
        let mut copy = *board;
        for command in turn.commands() {
            copy.move_line(command);
        }
        copy.adjacent_tiles().len()
    }

    fn best<T: Copy>(
        board: &Board,
        candidates: Vec<T>,
        to_turn: impl Fn(T) -> Turn,
    ) -> Option<T> {
        let mut best: Option<(T, usize)> = None;
        for candidate in candidates {
            let gain = Self::yield_of(board, to_turn(candidate));
            if best.is_none_or(|(_, top)| gain > top) {
                best = Some((candidate, gain));
            }
        }
        best.map(|(candidate, _)| candidate)
    }
}

impl MoveStrategy for GreedyStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_single_move(&mut self, board: &Board) -> Option<Command> {
        let choice = Self::best(board, board.single_moves(), Turn::Single);
        debug!(strategy = %self.name, ?choice, "Greedy single move");
        choice
    }

    fn choose_double_move(&mut self, board: &Board) -> Option<(Command, Command)> {
        let choice = Self::best(board, board.double_moves(), |(first, second)| {
            Turn::Double(first, second)
        });
        debug!(strategy = %self.name, ?choice, "Greedy double move");
        choice
    }
}
