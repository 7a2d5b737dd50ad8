//! Tests for the line protocol.

use collecto::{GameResult, Keyword, ProtocolError, Request, Response};
use collecto_board::{Board, Color, Command, CommandError, Coord, Turn};

fn cmd(value: i64) -> Command {
    Command::new(value).expect("valid command")
}

#[test]
fn test_parse_requests() {
    assert_eq!(
        "HELLO~my client".parse::<Request>(),
        Ok(Request::Hello("my client".to_string()))
    );
    assert_eq!(
        "LOGIN~ada".parse::<Request>(),
        Ok(Request::Login("ada".to_string()))
    );
    assert_eq!("QUEUE".parse::<Request>(), Ok(Request::Queue));
    assert_eq!("LIST".parse::<Request>(), Ok(Request::List));
    assert_eq!(
        "MOVE~3".parse::<Request>(),
        Ok(Request::Move(Turn::Single(cmd(3))))
    );
    assert_eq!(
        "MOVE~3~17".parse::<Request>(),
        Ok(Request::Move(Turn::Double(cmd(3), cmd(17))))
    );
}

#[test]
fn test_trailing_line_endings_are_ignored() {
    assert_eq!("QUEUE\r\n".parse::<Request>(), Ok(Request::Queue));
}

#[test]
fn test_malformed_requests() {
    assert_eq!("".parse::<Request>(), Err(ProtocolError::Empty));
    assert_eq!(
        "DANCE".parse::<Request>(),
        Err(ProtocolError::UnknownKeyword("DANCE".to_string()))
    );
    assert_eq!(
        "MOVE~28".parse::<Request>(),
        Err(ProtocolError::BadCommand(CommandError::OutOfRange(28)))
    );
    assert_eq!(
        "MOVE~up".parse::<Request>(),
        Err(ProtocolError::BadCommand(CommandError::NotANumber(
            "up".to_string()
        )))
    );
    assert!(matches!(
        "MOVE".parse::<Request>(),
        Err(ProtocolError::WrongArity { got: 0, .. })
    ));
    assert!(matches!(
        "MOVE~1~2~3".parse::<Request>(),
        Err(ProtocolError::WrongArity { got: 3, .. })
    ));
    assert!(matches!(
        "QUEUE~now".parse::<Request>(),
        Err(ProtocolError::WrongArity {
            keyword: Keyword::Queue,
            ..
        })
    ));
    assert_eq!("LOGIN~ ".parse::<Request>(), Err(ProtocolError::EmptyName));
    assert_eq!(
        "GAMEOVER~DRAW".parse::<Request>(),
        Err(ProtocolError::Unexpected(Keyword::GameOver))
    );
}

#[test]
fn test_format_requests() {
    assert_eq!(Request::Hello("bot".to_string()).to_string(), "HELLO~bot");
    assert_eq!(Request::Login("ada".to_string()).to_string(), "LOGIN~ada");
    assert_eq!(Request::Queue.to_string(), "QUEUE");
    assert_eq!(
        Request::Move(Turn::Double(cmd(0), cmd(27))).to_string(),
        "MOVE~0~27"
    );
}

#[test]
fn test_format_responses() {
    assert_eq!(Response::Login.to_string(), "LOGIN");
    assert_eq!(Response::AlreadyLoggedIn.to_string(), "ALREADYLOGGEDIN");
    assert_eq!(Response::List(vec![]).to_string(), "LIST");
    assert_eq!(
        Response::List(vec!["ada".to_string(), "bob".to_string()]).to_string(),
        "LIST~ada~bob"
    );
    assert_eq!(
        Response::GameOver(GameResult::Draw).to_string(),
        "GAMEOVER~DRAW"
    );
    assert_eq!(
        Response::GameOver(GameResult::Victory("ada".to_string())).to_string(),
        "GAMEOVER~VICTORY~ada"
    );
    assert_eq!(
        Response::GameOver(GameResult::Disconnect("bob".to_string())).to_string(),
        "GAMEOVER~DISCONNECT~bob"
    );
    assert_eq!(
        Response::Error("Not your turn".to_string()).to_string(),
        "ERROR~Not your turn"
    );
}

#[test]
fn test_new_game_lists_cells_then_names() {
    let mut board = Board::empty();
    board.set(Coord::new(0, 0), Color::Purple);
    board.set(Coord::new(6, 6), Color::Green);
    let response = Response::NewGame {
        board,
        first: "ada".to_string(),
        second: "bob".to_string(),
    };

    let line = response.to_string();
    let fields: Vec<&str> = line.split('~').collect();
    assert_eq!(fields.len(), 52);
    assert_eq!(fields[0], "NEWGAME");
    assert_eq!(fields[1], "5");
    assert_eq!(fields[49], "6");
    assert_eq!(&fields[50..], &["ada", "bob"]);

    assert_eq!(line.parse::<Response>(), Ok(response));
}

#[test]
fn test_parse_responses() {
    assert_eq!(
        "HELLO~Collecto server".parse::<Response>(),
        Ok(Response::Hello("Collecto server".to_string()))
    );
    assert_eq!(
        "MOVE~14".parse::<Response>(),
        Ok(Response::Move(Turn::Single(cmd(14))))
    );
    assert_eq!(
        "GAMEOVER~VICTORY~bob".parse::<Response>(),
        Ok(Response::GameOver(GameResult::Victory("bob".to_string())))
    );
    assert_eq!(
        "GAMEOVER~WHATEVER".parse::<Response>(),
        Err(ProtocolError::BadResult("WHATEVER".to_string()))
    );
    assert!("GAMEOVER~VICTORY".parse::<Response>().is_err());
    assert_eq!(
        "ERROR~bad~thing".parse::<Response>(),
        Ok(Response::Error("bad~thing".to_string()))
    );
    assert_eq!(
        "QUEUE".parse::<Response>(),
        Err(ProtocolError::Unexpected(Keyword::Queue))
    );
}

#[test]
fn test_malformed_new_game() {
    let short = format!("NEWGAME~{}~ada~bob", vec!["0"; 48].join("~"));
    assert!(matches!(
        short.parse::<Response>(),
        Err(ProtocolError::WrongArity { got: 50, .. })
    ));

    let mut cells = vec!["0"; 49];
    cells[3] = "9";
    let bad_code = format!("NEWGAME~{}~ada~bob", cells.join("~"));
    assert!(matches!(
        bad_code.parse::<Response>(),
        Err(ProtocolError::BadBoard(_))
    ));

    cells[3] = "red";
    let not_a_number = format!("NEWGAME~{}~ada~bob", cells.join("~"));
    assert_eq!(
        not_a_number.parse::<Response>(),
        Err(ProtocolError::BadCell("red".to_string()))
    );
}

#[test]
fn test_result_winner() {
    assert_eq!(GameResult::Draw.winner(), None);
    assert_eq!(GameResult::Victory("ada".to_string()).winner(), Some("ada"));
    assert_eq!(GameResult::Disconnect("bob".to_string()).winner(), Some("bob"));
}
