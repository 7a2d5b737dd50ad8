//! Uniformly random legal moves.

use super::MoveStrategy;
use crate::board::Board;
use crate::types::Command;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Picks any legal move at random.
pub struct NaiveStrategy {
    name: String,
    rng: StdRng,
}

impl NaiveStrategy {
    /// Creates a naive strategy seeded from the OS.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_rng(name, StdRng::from_entropy())
    }

    /// Creates a naive strategy with a fixed seed.
    pub fn seeded(name: impl Into<String>, seed: u64) -> Self {
        Self::with_rng(name, StdRng::seed_from_u64(seed))
    }

    fn with_rng(name: impl Into<String>, rng: StdRng) -> Self {
        Self {
            name: name.into(),
            rng,
        }
    }
}

impl MoveStrategy for NaiveStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_single_move(&mut self, board: &Board) -> Option<Command> {
        let choice = board.single_moves().choose(&mut self.rng).copied();
        debug!(strategy = %self.name, ?choice, "Naive single move");
        choice
    }

    fn choose_double_move(&mut self, board: &Board) -> Option<(Command, Command)> {
        let choice = board.double_moves().choose(&mut self.rng).copied();
        debug!(strategy = %self.name, ?choice, "Naive double move");
        choice
    }
}
