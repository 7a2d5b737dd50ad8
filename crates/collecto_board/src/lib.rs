//! Pure Collecto game logic.
//!
//! A 7×7 board of six tile colors. A move slides one row or column toward
//! an edge; tiles that end up next to a tile of the same color are removed
//! and credited to the mover, one point per three tiles of a color.
//!
//! # Example
//!
//! ```
//! use collecto_board::{Board, Command, Match, Outcome};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let board = Board::generate(&mut rng);
//! let mut game = Match::new("ada".into(), "bob".into(), board);
//!
//! let opening: Vec<Command> = game.board().single_moves();
//! if let Some(&command) = opening.first() {
//!     game.apply_single_move("ada", command).expect("listed moves are valid");
//! }
//! assert!(matches!(game.outcome(), Outcome::InProgress | Outcome::Draw | Outcome::Win(_)));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod game;
mod score;
mod strategy;
mod types;

pub use board::{Board, BoardError, GenerationError, MAX_TILES_PER_COLOR};
pub use game::{Match, MoveError, Outcome, ParticipantId};
pub use score::{Collected, TILES_PER_POINT};
pub use strategy::{GreedyStrategy, MoveStrategy, NaiveStrategy};
pub use types::{
    CELLS, COLOR_COUNT, COMMAND_COUNT, Cell, Color, Command, CommandError, Coord, DIM, Direction,
    Turn,
};
