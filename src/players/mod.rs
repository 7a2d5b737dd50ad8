//! Who picks the moves for a client.

mod human;

pub use human::HumanStrategy;

use clap::ValueEnum;
use collecto_board::{GreedyStrategy, MoveStrategy, NaiveStrategy};
use serde::{Deserialize, Serialize};
use std::io::BufReader;

/// Kinds of player a client can run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerKind {
    /// Commands typed on the terminal.
    Human,
    /// Uniformly random legal moves.
    Naive,
    /// Moves that clear the most tiles.
    Greedy,
}

impl PlayerKind {
    /// Builds the strategy for this kind. Humans play on stdin and stdout.
    pub fn build(self, name: &str) -> Box<dyn MoveStrategy> {
        match self {
            PlayerKind::Human => Box::new(HumanStrategy::new(
                name,
                BufReader::new(std::io::stdin()),
                std::io::stdout(),
            )),
            PlayerKind::Naive => Box::new(NaiveStrategy::new(name)),
            PlayerKind::Greedy => Box::new(GreedyStrategy::new(name)),
        }
    }
}
