//! Core domain types for Collecto.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};
use tracing::instrument;

/// Side length of the square board.
pub const DIM: usize = 7;

/// Number of cells on the board.
pub const CELLS: usize = DIM * DIM;

/// Number of distinct slide commands (four directions per line).
pub const COMMAND_COUNT: u8 = 4 * DIM as u8;

/// Number of tile colors.
pub const COLOR_COUNT: usize = 6;

/// Tile color. Discriminants are the wire codes (`0` is reserved for empty).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    strum::Display,
)]
pub enum Color {
    /// Wire code 1.
    Blue = 1,
    /// Wire code 2.
    Yellow = 2,
    /// Wire code 3.
    Red = 3,
    /// Wire code 4.
    Orange = 4,
    /// Wire code 5.
    Purple = 5,
    /// Wire code 6.
    Green = 6,
}

impl Color {
    /// Wire code of this color (`1..=6`).
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Looks up a color by wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::iter().find(|color| color.code() == code)
    }

    /// Zero-based slot used by per-color tallies.
    pub fn slot(self) -> usize {
        self as usize - 1
    }

    /// Single-letter symbol used by the text renderer.
    pub fn symbol(self) -> char {
        match self {
            Color::Blue => 'B',
            Color::Yellow => 'Y',
            Color::Red => 'R',
            Color::Orange => 'O',
            Color::Purple => 'P',
            Color::Green => 'G',
        }
    }
}

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// No tile.
    #[default]
    Empty,
    /// A tile of the given color.
    Tile(Color),
}

impl Cell {
    /// Checks if the cell holds no tile.
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Returns the tile color, if any.
    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::Tile(color) => Some(color),
        }
    }

    /// Wire code of this cell (`0` for empty).
    pub fn code(self) -> u8 {
        self.color().map_or(0, Color::code)
    }

    /// Decodes a wire code (`0..=6`).
    pub fn from_code(code: u8) -> Option<Self> {
        if code == 0 {
            Some(Cell::Empty)
        } else {
            Color::from_code(code).map(Cell::Tile)
        }
    }
}

impl From<Color> for Cell {
    fn from(color: Color) -> Self {
        Cell::Tile(color)
    }
}

/// Edge a line is slid toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, strum::Display)]
pub enum Direction {
    /// Slide a row toward column 0.
    Left,
    /// Slide a row toward the last column.
    Right,
    /// Slide a column toward row 0.
    Up,
    /// Slide a column toward the last row.
    Down,
}

impl Direction {
    /// Rows are addressed by `Left`/`Right`, columns by `Up`/`Down`.
    pub fn addresses_row(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Whether tiles pack toward index 0 of the line.
    pub fn packs_toward_start(self) -> bool {
        matches!(self, Direction::Left | Direction::Up)
    }

    fn ordinal(self) -> u8 {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }
}

/// Board coordinate: `x` is the column, `y` the row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[display("({x}, {y})")]
pub struct Coord {
    /// Column, `0..DIM`.
    pub x: usize,
    /// Row, `0..DIM`.
    pub y: usize,
}

impl Coord {
    /// The geometric center, empty after generation.
    pub const CENTER: Coord = Coord {
        x: DIM / 2,
        y: DIM / 2,
    };

    /// Creates a coordinate.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Row-major index `x + DIM * y`.
    pub fn to_index(self) -> usize {
        self.x + DIM * self.y
    }

    /// Inverse of [`Coord::to_index`].
    pub fn from_index(index: usize) -> Self {
        Self {
            x: index % DIM,
            y: index / DIM,
        }
    }

    /// In-bounds orthogonal neighbours.
    pub fn neighbours(self) -> impl Iterator<Item = Coord> {
        let Coord { x, y } = self;
        [
            (x > 0).then(|| Coord::new(x - 1, y)),
            (x + 1 < DIM).then(|| Coord::new(x + 1, y)),
            (y > 0).then(|| Coord::new(x, y - 1)),
            (y + 1 < DIM).then(|| Coord::new(x, y + 1)),
        ]
        .into_iter()
        .flatten()
    }
}

/// A slide command in `[0, 28)`.
///
/// Every seven consecutive commands share a direction in the order
/// left, right, up, down; the remainder picks the row or column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[display("{_0}")]
pub struct Command(u8);

impl Command {
    /// Validates a raw command number.
    #[instrument]
    pub fn new(value: i64) -> Result<Self, CommandError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v < COMMAND_COUNT)
            .map(Self)
            .ok_or(CommandError::OutOfRange(value))
    }

    /// Builds the command addressing `line` in `direction`.
    ///
    /// `line` must be below [`DIM`].
    pub fn from_parts(direction: Direction, line: usize) -> Self {
        debug_assert!(line < DIM, "line index {line} out of range");
        Self(direction.ordinal() * DIM as u8 + line as u8)
    }

    /// Raw command number.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Direction of the slide (`command / 7`).
    pub fn direction(self) -> Direction {
        match self.0 as usize / DIM {
            0 => Direction::Left,
            1 => Direction::Right,
            2 => Direction::Up,
            _ => Direction::Down,
        }
    }

    /// Row or column addressed (`command % 7`).
    pub fn line_index(self) -> usize {
        self.0 as usize % DIM
    }

    /// All 28 commands in ascending order.
    pub fn all() -> impl Iterator<Item = Command> {
        (0..COMMAND_COUNT).map(Command)
    }
}

impl std::str::FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| CommandError::NotANumber(s.to_string()))?;
        Self::new(value)
    }
}

/// Error building a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum CommandError {
    /// Number outside `[0, 28)`.
    #[display("Command {} is outside 0..{}", _0, COMMAND_COUNT)]
    OutOfRange(i64),
    /// Text that is not an integer.
    #[display("'{}' is not a command number", _0)]
    NotANumber(String),
}

impl std::error::Error for CommandError {}

/// One player turn: a single slide, or two slides played as a last resort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Turn {
    /// One slide that immediately creates an adjacency.
    #[display("{_0}")]
    Single(Command),
    /// Two slides, the first enabling the second.
    #[display("{_0} then {_1}")]
    Double(Command, Command),
}

impl Turn {
    /// Commands of this turn in play order.
    pub fn commands(&self) -> Vec<Command> {
        match *self {
            Turn::Single(c) => vec![c],
            Turn::Double(first, second) => vec![first, second],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_folding() {
        let index = |v| Command::new(v).unwrap().line_index();
        assert_eq!(index(6), 6);
        assert_eq!(index(12), 5);
        assert_eq!(index(18), 4);
        assert_eq!(index(25), 4);
        assert_eq!(index(7), 0);
        assert_eq!(index(0), 0);
        assert_eq!(index(21), 0);
        assert_eq!(index(14), 0);
    }

    #[test]
    fn test_command_directions() {
        let dir = |v| Command::new(v).unwrap().direction();
        assert_eq!(dir(0), Direction::Left);
        assert_eq!(dir(13), Direction::Right);
        assert_eq!(dir(14), Direction::Up);
        assert_eq!(dir(27), Direction::Down);
    }

    #[test]
    fn test_command_range() {
        assert_eq!(Command::new(28), Err(CommandError::OutOfRange(28)));
        assert_eq!(Command::new(54), Err(CommandError::OutOfRange(54)));
        assert_eq!(Command::new(-1), Err(CommandError::OutOfRange(-1)));
        assert!("x".parse::<Command>().is_err());
        assert_eq!("27".parse::<Command>().unwrap().value(), 27);
    }

    #[test]
    fn test_from_parts_round_trips() {
        for command in Command::all() {
            let rebuilt = Command::from_parts(command.direction(), command.line_index());
            assert_eq!(rebuilt, command);
        }
    }

    #[test]
    fn test_corner_has_two_neighbours() {
        assert_eq!(Coord::new(0, 0).neighbours().count(), 2);
        assert_eq!(Coord::new(6, 3).neighbours().count(), 3);
        assert_eq!(Coord::CENTER.neighbours().count(), 4);
    }
}
