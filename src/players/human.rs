//! Human player typing commands on a terminal.

use collecto_board::{Board, Command, CommandError, GreedyStrategy, MoveStrategy, Turn};
use std::io::{self, BufRead, Write};
use tracing::warn;

const HELP: &str = "\
Commands 0-6 slide row 0-6 left, 7-13 slide row 0-6 right,
14-20 slide column 0-6 up, 21-27 slide column 0-6 down.
Type one command, or two separated by a space when no single move is left.
'hint' suggests a move, 'board' shows the board again.";

/// Human player reading commands from `input` and talking on `output`.
pub struct HumanStrategy<R, W> {
    name: String,
    input: R,
    output: W,
    advisor: GreedyStrategy,
}

impl<R: BufRead, W: Write> HumanStrategy<R, W> {
    /// Creates a human player on the given streams.
    pub fn new(name: impl Into<String>, input: R, output: W) -> Self {
        let name = name.into();
        Self {
            advisor: GreedyStrategy::new(format!("{name} (hint)")),
            name,
            input,
            output,
        }
    }

    /// Gives back the output stream.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Prompts until a valid turn is typed. `None` when input ends.
    fn prompt_turn(&mut self, board: &Board) -> io::Result<Option<Turn>> {
        let double = !board.single_move_possible();
        writeln!(self.output, "{board}")?;
        loop {
            if double {
                write!(
                    self.output,
                    "No single move left. Two commands (e.g. '3 17'), 'hint' or 'help': "
                )?;
            } else {
                write!(self.output, "Command (0-27), 'hint' or 'help': ")?;
            }
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            match line.trim() {
                "" => continue,
                "help" => {
                    writeln!(self.output, "{HELP}")?;
                    continue;
                }
                "board" => {
                    writeln!(self.output, "{board}")?;
                    continue;
                }
                "hint" => {
                    match self.advisor.choose_turn(board) {
                        Some(turn) => writeln!(self.output, "Try {turn}")?,
                        None => writeln!(self.output, "No move left")?,
                    }
                    continue;
                }
                _ => {}
            }

            match parse_turn(line.trim()) {
                Ok(Some(turn)) if board.turn_valid(turn) => return Ok(Some(turn)),
                Ok(Some(turn)) => writeln!(self.output, "{turn} is not a valid move here")?,
                Ok(None) => writeln!(self.output, "Type one or two commands")?,
                Err(err) => writeln!(self.output, "{err}")?,
            }
        }
    }

    fn ask(&mut self, board: &Board) -> Option<Turn> {
        self.prompt_turn(board).unwrap_or_else(|err| {
            warn!(error = %err, "Terminal unavailable");
            None
        })
    }
}

/// One or two whitespace separated commands.
fn parse_turn(line: &str) -> Result<Option<Turn>, CommandError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    Ok(match fields.as_slice() {
        [single] => Some(Turn::Single(single.parse::<Command>()?)),
        [first, second] => Some(Turn::Double(
            first.parse::<Command>()?,
            second.parse::<Command>()?,
        )),
        _ => None,
    })
}

impl<R: BufRead + Send, W: Write + Send> MoveStrategy for HumanStrategy<R, W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_single_move(&mut self, board: &Board) -> Option<Command> {
        if !board.single_move_possible() {
            return None;
        }
        match self.ask(board)? {
            Turn::Single(command) => Some(command),
            Turn::Double(..) => None,
        }
    }

    fn choose_double_move(&mut self, board: &Board) -> Option<(Command, Command)> {
        if board.single_move_possible() || !board.double_move_possible() {
            return None;
        }
        match self.ask(board)? {
            Turn::Double(first, second) => Some((first, second)),
            Turn::Single(_) => None,
        }
    }

    fn choose_turn(&mut self, board: &Board) -> Option<Turn> {
        if board.game_over() {
            return None;
        }
        self.ask(board)
    }
}
