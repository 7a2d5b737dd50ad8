//! The 7×7 Collecto board and its rule algorithms.
//!
//! The grid is a flat row-major array so that legality checks can simulate a
//! move on a bitwise copy and throw it away.

use crate::score::Collected;
use crate::types::{CELLS, COLOR_COUNT, Cell, Color, Command, Coord, DIM, Turn};
use derive_more::Display;
use rand::Rng;
use std::fmt;
use tracing::{debug, instrument, trace};

/// No color may appear more often than this on a fresh board.
pub const MAX_TILES_PER_COLOR: u32 = 8;

const PALETTE: [Color; COLOR_COUNT] = [
    Color::Blue,
    Color::Yellow,
    Color::Red,
    Color::Orange,
    Color::Purple,
    Color::Green,
];

/// Collecto board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    /// Cells in row-major order (`x + 7y`).
    cells: [Cell; CELLS],
}

impl Board {
    /// Creates a board with every cell empty.
    pub fn empty() -> Self {
        Self {
            cells: [Cell::Empty; CELLS],
        }
    }

    /// Creates a board from row-major cells.
    pub fn from_cells(cells: [Cell; CELLS]) -> Self {
        Self { cells }
    }

    /// Decodes 49 row-major wire codes (`0` empty, `1..=6` colors).
    #[instrument(skip(codes), fields(len = codes.len()))]
    pub fn from_wire(codes: &[u8]) -> Result<Self, BoardError> {
        if codes.len() != CELLS {
            return Err(BoardError::WrongLength(codes.len()));
        }
        let mut board = Self::empty();
        for (index, &code) in codes.iter().enumerate() {
            board.cells[index] =
                Cell::from_code(code).ok_or(BoardError::BadCell { index, code })?;
        }
        Ok(board)
    }

    /// Encodes the board as 49 row-major wire codes.
    pub fn to_wire(&self) -> [u8; CELLS] {
        self.cells.map(Cell::code)
    }

    /// Returns all cells in row-major order.
    pub fn cells(&self) -> &[Cell; CELLS] {
        &self.cells
    }

    /// Gets the cell at `coord`.
    pub fn get(&self, coord: Coord) -> Cell {
        self.cells[coord.to_index()]
    }

    /// Sets the cell at `coord`.
    pub fn set(&mut self, coord: Coord, cell: impl Into<Cell>) {
        self.cells[coord.to_index()] = cell.into();
    }

    /// Number of tiles of each color currently on the board.
    pub fn color_counts(&self) -> Collected {
        let mut counts = Collected::new();
        for color in self.cells.iter().filter_map(|cell| cell.color()) {
            counts.add(color);
        }
        counts
    }

    // ─────────────────────────────────────────────────────────────
    //  Generation
    // ─────────────────────────────────────────────────────────────

    /// Generates a fresh playable board, retrying until one is found.
    ///
    /// Every cell but the center holds a tile, no two orthogonal neighbours
    /// share a color, no color is used more than eight times, and at least one
    /// single or double move is legal.
    #[instrument(skip(rng))]
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let mut discarded: u64 = 0;
        loop {
            if let Some(board) = Self::try_generate(rng) {
                debug!(discarded, "Generated board");
                return board;
            }
            discarded += 1;
        }
    }

    /// Like [`Board::generate`] but gives up after `max_attempts` discarded boards.
    #[instrument(skip(rng))]
    pub fn generate_bounded<R: Rng>(
        rng: &mut R,
        max_attempts: usize,
    ) -> Result<Self, GenerationError> {
        for attempt in 1..=max_attempts {
            if let Some(board) = Self::try_generate(rng) {
                debug!(attempt, "Generated board");
                return Ok(board);
            }
        }
        Err(GenerationError::Exhausted {
            attempts: max_attempts,
        })
    }

    /// One generation pass. `None` means the board was discarded.
    fn try_generate<R: Rng>(rng: &mut R) -> Option<Self> {
        let mut board = Self::empty();
        let mut tally = Collected::new();

        for index in 0..CELLS {
            let coord = Coord::from_index(index);
            if coord == Coord::CENTER {
                continue;
            }

            let left = (coord.x > 0).then(|| board.get(Coord::new(coord.x - 1, coord.y)));
            let above = (coord.y > 0).then(|| board.get(Coord::new(coord.x, coord.y - 1)));

            let color = loop {
                let candidate = PALETTE[rng.gen_range(0..COLOR_COUNT)];
                let cell = Some(Cell::Tile(candidate));
                if cell != left && cell != above {
                    break candidate;
                }
            };

            tally.add(color);
            if tally.count(color) > MAX_TILES_PER_COLOR {
                trace!(%color, "Color over budget, discarding board");
                return None;
            }
            board.set(coord, color);
        }

        if board.single_move_possible() || board.double_move_possible() {
            Some(board)
        } else {
            trace!("No opening move, discarding board");
            None
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Lines
    // ─────────────────────────────────────────────────────────────

    /// Coordinates of the line addressed by `command`, ordered from the edge
    /// the tiles slide toward.
    fn line_coords(command: Command) -> [Coord; DIM] {
        let line = command.line_index();
        let direction = command.direction();
        std::array::from_fn(|i| {
            let position = if direction.packs_toward_start() {
                i
            } else {
                DIM - 1 - i
            };
            if direction.addresses_row() {
                Coord::new(position, line)
            } else {
                Coord::new(line, position)
            }
        })
    }

    /// Checks if row `index` has at least one empty cell.
    pub fn row_free_space(&self, index: usize) -> bool {
        (0..DIM).any(|x| self.get(Coord::new(x, index)).is_empty())
    }

    /// Checks if column `index` has at least one empty cell.
    pub fn column_free_space(&self, index: usize) -> bool {
        (0..DIM).any(|y| self.get(Coord::new(index, y)).is_empty())
    }

    fn addressed_line_free(&self, command: Command) -> bool {
        if command.direction().addresses_row() {
            self.row_free_space(command.line_index())
        } else {
            self.column_free_space(command.line_index())
        }
    }

    /// Commands whose addressed line has room to slide.
    ///
    /// Necessary but not sufficient for legality.
    pub fn possible_moves(&self) -> Vec<Command> {
        Command::all()
            .filter(|&command| self.addressed_line_free(command))
            .collect()
    }

    /// Slides the addressed line toward its edge.
    ///
    /// Tiles keep their relative order; cells left behind become empty.
    pub fn move_line(&mut self, command: Command) {
        let coords = Self::line_coords(command);
        let mut packed = [Cell::Empty; DIM];
        let mut next = 0;
        for coord in coords {
            let cell = self.get(coord);
            if !cell.is_empty() {
                packed[next] = cell;
                next += 1;
            }
        }
        for (coord, cell) in coords.into_iter().zip(packed) {
            self.set(coord, cell);
        }
    }

    /// Returns a copy of the board with `command` applied.
    fn simulate(&self, command: Command) -> Self {
        let mut copy = *self;
        copy.move_line(command);
        copy
    }

    // ─────────────────────────────────────────────────────────────
    //  Adjacency and removal
    // ─────────────────────────────────────────────────────────────

    /// Every tile with an orthogonal neighbour of the same color, in
    /// row-major order.
    pub fn adjacent_tiles(&self) -> Vec<Coord> {
        (0..CELLS)
            .map(Coord::from_index)
            .filter(|&coord| {
                let cell = self.get(coord);
                !cell.is_empty() && coord.neighbours().any(|n| self.get(n) == cell)
            })
            .collect()
    }

    /// Checks if any two neighbouring tiles share a color.
    pub fn adjacent_tiles_present(&self) -> bool {
        (0..CELLS).map(Coord::from_index).any(|coord| {
            let cell = self.get(coord);
            !cell.is_empty() && coord.neighbours().any(|n| self.get(n) == cell)
        })
    }

    /// Clears every adjacent tile and returns how many of each color went.
    ///
    /// The affected set is read in full before any cell is cleared, and
    /// removal does not cascade.
    #[instrument(skip(self))]
    pub fn remove_adjacent(&mut self) -> Collected {
        let snapshot = self.adjacent_tiles();
        let mut removed = Collected::new();
        for coord in snapshot {
            if let Some(color) = self.get(coord).color() {
                removed.add(color);
            }
            self.set(coord, Cell::Empty);
        }
        debug!(removed = removed.total(), "Removed adjacent tiles");
        removed
    }

    // ─────────────────────────────────────────────────────────────
    //  Legality
    // ─────────────────────────────────────────────────────────────

    /// Checks if `command` slides something and leaves an adjacency behind.
    pub fn single_move_valid(&self, command: Command) -> bool {
        self.addressed_line_free(command) && self.simulate(command).adjacent_tiles_present()
    }

    /// Checks if `first` followed by `second` is a legal double move.
    ///
    /// Only legal when no single move exists on the current board.
    pub fn double_move_valid(&self, first: Command, second: Command) -> bool {
        !self.single_move_possible() && self.double_move_enabled(first, second)
    }

    /// `second` is a valid single move once `first` has been played.
    fn double_move_enabled(&self, first: Command, second: Command) -> bool {
        self.addressed_line_free(first) && self.simulate(first).single_move_valid(second)
    }

    /// Checks a whole turn.
    pub fn turn_valid(&self, turn: Turn) -> bool {
        match turn {
            Turn::Single(command) => self.single_move_valid(command),
            Turn::Double(first, second) => self.double_move_valid(first, second),
        }
    }

    /// All valid single moves, ascending.
    pub fn single_moves(&self) -> Vec<Command> {
        Command::all()
            .filter(|&command| self.single_move_valid(command))
            .collect()
    }

    /// All valid double moves, ordered by first then second command.
    pub fn double_moves(&self) -> Vec<(Command, Command)> {
        if self.single_move_possible() {
            return Vec::new();
        }
        self.possible_moves()
            .into_iter()
            .flat_map(|first| Command::all().map(move |second| (first, second)))
            .filter(|&(first, second)| self.double_move_enabled(first, second))
            .collect()
    }

    /// Checks if any single move is valid.
    pub fn single_move_possible(&self) -> bool {
        Command::all().any(|command| self.single_move_valid(command))
    }

    /// Checks if any double move is valid.
    pub fn double_move_possible(&self) -> bool {
        !self.single_move_possible()
            && self.possible_moves().into_iter().any(|first| {
                Command::all().any(|second| self.double_move_enabled(first, second))
            })
    }

    /// The game ends when neither a single nor a double move is valid.
    pub fn game_over(&self) -> bool {
        !self.single_move_possible() && !self.double_move_possible()
    }

    /// Plays every slide of `turn`, then removes adjacent tiles once.
    ///
    /// Does not check legality; see [`Board::turn_valid`].
    pub fn apply_turn(&mut self, turn: Turn) -> Collected {
        for command in turn.commands() {
            self.move_line(command);
        }
        self.remove_adjacent()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = format!("     +{}", "---+".repeat(DIM));

        write!(f, "      ")?;
        for x in 0..DIM {
            write!(f, "{:<4}", 3 * DIM + x)?;
        }
        writeln!(f)?;
        writeln!(f, "       {}", ["v"; DIM].join("   "))?;

        for y in 0..DIM {
            writeln!(f, "{rule}")?;
            write!(f, "{:>2} > |", DIM + y)?;
            for x in 0..DIM {
                let symbol = self.get(Coord::new(x, y)).color().map_or(' ', Color::symbol);
                write!(f, " {symbol} |")?;
            }
            writeln!(f, " < {y}")?;
        }
        writeln!(f, "{rule}")?;

        writeln!(f, "       {}", ["^"; DIM].join("   "))?;
        write!(f, "      ")?;
        for x in 0..DIM {
            write!(f, "{:<4}", 2 * DIM + x)?;
        }
        Ok(())
    }
}

/// Error decoding a board from wire codes.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum BoardError {
    /// Not exactly 49 cells.
    #[display("Board has {} cells, expected {}", _0, CELLS)]
    WrongLength(usize),
    /// A cell code outside `0..=6`.
    #[display("Cell {} has invalid code {}", index, code)]
    BadCell {
        /// Row-major cell index.
        index: usize,
        /// Offending code.
        code: u8,
    },
}

impl std::error::Error for BoardError {}

/// Bounded board generation ran out of attempts.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerationError {
    /// Every attempt was discarded.
    #[display("No playable board after {} attempts", attempts)]
    Exhausted {
        /// Attempts made.
        attempts: usize,
    },
}

impl std::error::Error for GenerationError {}
