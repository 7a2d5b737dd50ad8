//! Line protocol between Collecto clients and the server.
//!
//! One message per line, fields separated by `~`. The first field names the
//! message; the rest are its arguments.

use collecto_board::{Board, BoardError, CELLS, Command, CommandError, ParticipantId, Turn};
use derive_more::Display;
use std::fmt;
use std::str::FromStr;
use strum::EnumString;
use tracing::instrument;

/// Field separator.
pub const DELIMITER: char = '~';

/// First field of every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Keyword {
    /// Handshake, both directions.
    #[display("HELLO")]
    Hello,
    /// Login request, or its acknowledgement.
    #[display("LOGIN")]
    Login,
    /// Login refused: the name is taken.
    #[display("ALREADYLOGGEDIN")]
    AlreadyLoggedIn,
    /// Toggle queue membership.
    #[display("QUEUE")]
    Queue,
    /// List logged-in participants.
    #[display("LIST")]
    List,
    /// A match has started.
    #[display("NEWGAME")]
    NewGame,
    /// Move request, or its broadcast.
    #[display("MOVE")]
    Move,
    /// A match has ended.
    #[display("GAMEOVER")]
    GameOver,
    /// Request rejected.
    #[display("ERROR")]
    Error,
}

/// Sub-keyword of a `GAMEOVER` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
enum ResultKind {
    #[display("DRAW")]
    Draw,
    #[display("VICTORY")]
    Victory,
    #[display("DISCONNECT")]
    Disconnect,
}

/// How a match ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameResult {
    /// No moves left, equal scores.
    Draw,
    /// No moves left; carries the winner.
    Victory(ParticipantId),
    /// The opponent dropped; carries the participant awarded the win.
    ///
    /// Only that participant receives it, so the name is their own rather
    /// than the departed opponent's.
    Disconnect(ParticipantId),
}

impl GameResult {
    /// Winner, if the match was not drawn.
    pub fn winner(&self) -> Option<&str> {
        match self {
            GameResult::Draw => None,
            GameResult::Victory(winner) | GameResult::Disconnect(winner) => Some(winner),
        }
    }
}

/// Message sent by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `HELLO~<description>`
    Hello(String),
    /// `LOGIN~<name>`
    Login(ParticipantId),
    /// `QUEUE`
    Queue,
    /// `LIST`
    List,
    /// `MOVE~<c>` or `MOVE~<c1>~<c2>`
    Move(Turn),
}

/// Message sent by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `HELLO~<server name>`
    Hello(String),
    /// `LOGIN`
    Login,
    /// `ALREADYLOGGEDIN`
    AlreadyLoggedIn,
    /// `LIST~<name>...`
    List(Vec<ParticipantId>),
    /// `NEWGAME~<49 cells>~<first mover>~<second>`
    NewGame {
        /// Initial board.
        board: Board,
        /// Participant who moves first.
        first: ParticipantId,
        /// The other participant.
        second: ParticipantId,
    },
    /// `MOVE~<c>` or `MOVE~<c1>~<c2>`
    Move(Turn),
    /// `GAMEOVER~DRAW`, `GAMEOVER~VICTORY~<name>`, `GAMEOVER~DISCONNECT~<name>`
    GameOver(GameResult),
    /// `ERROR~<reason>`
    Error(String),
}

/// A line that does not form a valid message.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ProtocolError {
    /// Blank line.
    #[display("Empty message")]
    Empty,
    /// First field is not a known message.
    #[display("Unknown message '{}'", _0)]
    UnknownKeyword(String),
    /// Wrong number of fields for the message.
    #[display("{} takes {} argument(s), got {}", keyword, expected, got)]
    WrongArity {
        /// Message name.
        keyword: Keyword,
        /// Accepted argument counts, for display.
        expected: &'static str,
        /// Arguments received.
        got: usize,
    },
    /// A message that only flows the other way.
    #[display("{} is not valid in this direction", _0)]
    Unexpected(Keyword),
    /// A name argument that is empty.
    #[display("Name must not be empty")]
    EmptyName,
    /// A move argument that is not a command.
    #[display("{}", _0)]
    BadCommand(CommandError),
    /// A board cell that is not a number.
    #[display("Board cell '{}' is not a number", _0)]
    BadCell(String),
    /// Board with the wrong shape or codes.
    #[display("{}", _0)]
    BadBoard(BoardError),
    /// Unknown `GAMEOVER` result.
    #[display("Unknown game result '{}'", _0)]
    BadResult(String),
}

impl std::error::Error for ProtocolError {}

impl From<CommandError> for ProtocolError {
    fn from(err: CommandError) -> Self {
        ProtocolError::BadCommand(err)
    }
}

impl From<BoardError> for ProtocolError {
    fn from(err: BoardError) -> Self {
        ProtocolError::BadBoard(err)
    }
}

/// Splits a line into its keyword and arguments.
fn split_line(line: &str) -> Result<(Keyword, Vec<&str>), ProtocolError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(ProtocolError::Empty);
    }
    let mut fields = line.split(DELIMITER);
    let head = fields.next().unwrap_or_default();
    let keyword = Keyword::from_str(head)
        .map_err(|_| ProtocolError::UnknownKeyword(head.to_string()))?;
    Ok((keyword, fields.collect()))
}

fn expect_arity(
    keyword: Keyword,
    args: &[&str],
    accepted: &[usize],
    expected: &'static str,
) -> Result<(), ProtocolError> {
    if accepted.contains(&args.len()) {
        Ok(())
    } else {
        Err(ProtocolError::WrongArity {
            keyword,
            expected,
            got: args.len(),
        })
    }
}

fn parse_name(field: &str) -> Result<ParticipantId, ProtocolError> {
    let name = field.trim();
    if name.is_empty() {
        Err(ProtocolError::EmptyName)
    } else {
        Ok(name.to_string())
    }
}

fn parse_turn(args: &[&str]) -> Result<Turn, ProtocolError> {
    match args {
        [single] => Ok(Turn::Single(single.parse::<Command>()?)),
        [first, second] => Ok(Turn::Double(
            first.parse::<Command>()?,
            second.parse::<Command>()?,
        )),
        _ => Err(ProtocolError::WrongArity {
            keyword: Keyword::Move,
            expected: "1 or 2",
            got: args.len(),
        }),
    }
}

fn write_turn(f: &mut fmt::Formatter<'_>, turn: &Turn) -> fmt::Result {
    write!(f, "{}", Keyword::Move)?;
    for command in turn.commands() {
        write!(f, "{DELIMITER}{command}")?;
    }
    Ok(())
}

impl FromStr for Request {
    type Err = ProtocolError;

    #[instrument]
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (keyword, args) = split_line(line)?;
        match keyword {
            Keyword::Hello => {
                expect_arity(keyword, &args, &[1], "1")?;
                Ok(Request::Hello(args[0].to_string()))
            }
            Keyword::Login => {
                expect_arity(keyword, &args, &[1], "1")?;
                Ok(Request::Login(parse_name(args[0])?))
            }
            Keyword::Queue => {
                expect_arity(keyword, &args, &[0], "0")?;
                Ok(Request::Queue)
            }
            Keyword::List => {
                expect_arity(keyword, &args, &[0], "0")?;
                Ok(Request::List)
            }
            Keyword::Move => Ok(Request::Move(parse_turn(&args)?)),
            other => Err(ProtocolError::Unexpected(other)),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Hello(description) => {
                write!(f, "{}{DELIMITER}{description}", Keyword::Hello)
            }
            Request::Login(name) => write!(f, "{}{DELIMITER}{name}", Keyword::Login),
            Request::Queue => write!(f, "{}", Keyword::Queue),
            Request::List => write!(f, "{}", Keyword::List),
            Request::Move(turn) => write_turn(f, turn),
        }
    }
}

impl FromStr for Response {
    type Err = ProtocolError;

    #[instrument]
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (keyword, args) = split_line(line)?;
        match keyword {
            Keyword::Hello => {
                expect_arity(keyword, &args, &[1], "1")?;
                Ok(Response::Hello(args[0].to_string()))
            }
            Keyword::Login => {
                expect_arity(keyword, &args, &[0], "0")?;
                Ok(Response::Login)
            }
            Keyword::AlreadyLoggedIn => {
                expect_arity(keyword, &args, &[0], "0")?;
                Ok(Response::AlreadyLoggedIn)
            }
            Keyword::List => Ok(Response::List(
                args.iter().map(|name| name.to_string()).collect(),
            )),
            Keyword::NewGame => {
                expect_arity(keyword, &args, &[CELLS + 2], "51")?;
                let codes = args[..CELLS]
                    .iter()
                    .map(|field| {
                        field
                            .trim()
                            .parse::<u8>()
                            .map_err(|_| ProtocolError::BadCell(field.to_string()))
                    })
                    .collect::<Result<Vec<u8>, _>>()?;
                Ok(Response::NewGame {
                    board: Board::from_wire(&codes)?,
                    first: parse_name(args[CELLS])?,
                    second: parse_name(args[CELLS + 1])?,
                })
            }
            Keyword::Move => Ok(Response::Move(parse_turn(&args)?)),
            Keyword::GameOver => {
                let kind = args
                    .first()
                    .and_then(|kind| ResultKind::from_str(kind).ok())
                    .ok_or_else(|| {
                        ProtocolError::BadResult(args.first().unwrap_or(&"").to_string())
                    })?;
                match kind {
                    ResultKind::Draw => {
                        expect_arity(keyword, &args, &[1], "1")?;
                        Ok(Response::GameOver(GameResult::Draw))
                    }
                    ResultKind::Victory => {
                        expect_arity(keyword, &args, &[2], "2")?;
                        Ok(Response::GameOver(GameResult::Victory(parse_name(args[1])?)))
                    }
                    ResultKind::Disconnect => {
                        expect_arity(keyword, &args, &[2], "2")?;
                        Ok(Response::GameOver(GameResult::Disconnect(parse_name(
                            args[1],
                        )?)))
                    }
                }
            }
            Keyword::Error => Ok(Response::Error(args.join(DELIMITER.to_string().as_str()))),
            other => Err(ProtocolError::Unexpected(other)),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Hello(server) => write!(f, "{}{DELIMITER}{server}", Keyword::Hello),
            Response::Login => write!(f, "{}", Keyword::Login),
            Response::AlreadyLoggedIn => write!(f, "{}", Keyword::AlreadyLoggedIn),
            Response::List(names) => {
                write!(f, "{}", Keyword::List)?;
                for name in names {
                    write!(f, "{DELIMITER}{name}")?;
                }
                Ok(())
            }
            Response::NewGame {
                board,
                first,
                second,
            } => {
                write!(f, "{}", Keyword::NewGame)?;
                for code in board.to_wire() {
                    write!(f, "{DELIMITER}{code}")?;
                }
                write!(f, "{DELIMITER}{first}{DELIMITER}{second}")
            }
            Response::Move(turn) => write_turn(f, turn),
            Response::GameOver(result) => {
                write!(f, "{}{DELIMITER}", Keyword::GameOver)?;
                match result {
                    GameResult::Draw => write!(f, "{}", ResultKind::Draw),
                    GameResult::Victory(winner) => {
                        write!(f, "{}{DELIMITER}{winner}", ResultKind::Victory)
                    }
                    GameResult::Disconnect(winner) => {
                        write!(f, "{}{DELIMITER}{winner}", ResultKind::Disconnect)
                    }
                }
            }
            Response::Error(reason) => write!(f, "{}{DELIMITER}{reason}", Keyword::Error),
        }
    }
}
