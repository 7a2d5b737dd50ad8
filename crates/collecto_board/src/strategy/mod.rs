//! Move-selection strategies.

mod greedy;
mod naive;

pub use greedy::GreedyStrategy;
pub use naive::NaiveStrategy;

use crate::board::Board;
use crate::types::{Command, Turn};

/// Something that picks moves for a participant.
///
/// Implementations may block (a human typing a command); callers must not
/// hold any match lock while asking.
pub trait MoveStrategy: Send {
    /// Display name of the strategy.
    fn name(&self) -> &str;

    /// Picks a valid single move, or `None` if there is none (or input ended).
    fn choose_single_move(&mut self, board: &Board) -> Option<Command>;

    /// Picks a valid double move, or `None` if there is none (or input ended).
    fn choose_double_move(&mut self, board: &Board) -> Option<(Command, Command)>;

    /// Picks a whole turn: a single move when one exists, otherwise a double.
    fn choose_turn(&mut self, board: &Board) -> Option<Turn> {
        if board.single_move_possible() {
            self.choose_single_move(board).map(Turn::Single)
        } else {
            self.choose_double_move(board)
                .map(|(first, second)| Turn::Double(first, second))
        }
    }
}
