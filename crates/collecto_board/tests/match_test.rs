//! Tests for match scoring and outcomes.

use collecto_board::{Board, Color, Command, Coord, Match, MoveError, Outcome};

fn cmd(value: i64) -> Command {
    Command::new(value).expect("valid command")
}

fn board_with(tiles: &[((usize, usize), Color)]) -> Board {
    let mut board = Board::empty();
    for &((x, y), color) in tiles {
        board.set(Coord::new(x, y), color);
    }
    board
}

/// A yellow pair closed by command 14 and a green triple closed by command 26.
fn two_group_board() -> Board {
    board_with(&[
        ((0, 0), Color::Yellow),
        ((0, 2), Color::Yellow),
        ((4, 6), Color::Green),
        ((6, 6), Color::Green),
        ((5, 3), Color::Green),
    ])
}

fn new_match(board: Board) -> Match {
    Match::new("ada".to_string(), "bob".to_string(), board)
}

#[test]
fn test_participants_and_opponents() {
    let game = new_match(two_group_board());
    assert_eq!(game.participants(), &["ada".to_string(), "bob".to_string()]);
    assert_eq!(game.seat("bob"), Some(1));
    assert_eq!(game.opponent_of("ada").map(String::as_str), Some("bob"));
    assert_eq!(game.opponent_of("eve"), None);
    assert_eq!(game.score("ada"), Some(0));
    assert_eq!(game.outcome(), Outcome::InProgress);
}

#[test]
fn test_single_move_credits_the_mover() {
    let mut game = new_match(two_group_board());

    let removed = game.apply_single_move("ada", cmd(14)).expect("valid move");
    assert_eq!(removed.count(Color::Yellow), 2);
    assert_eq!(game.collected("ada").map(|c| c.count(Color::Yellow)), Some(2));
    assert_eq!(game.score("ada"), Some(0));
    assert_eq!(game.collected("bob").map(|c| c.total()), Some(0));
    assert!(!game.is_over());
}

#[test]
fn test_higher_score_wins() {
    let mut game = new_match(two_group_board());
    game.apply_single_move("ada", cmd(14)).expect("valid move");
    game.apply_single_move("bob", cmd(26)).expect("valid move");

    assert!(game.is_over());
    assert_eq!(game.score("bob"), Some(1));
    assert_eq!(game.outcome(), Outcome::Win("bob".to_string()));
}

#[test]
fn test_equal_scores_draw() {
    let mut game = new_match(board_with(&[
        ((0, 0), Color::Green),
        ((1, 5), Color::Green),
    ]));
    game.apply_single_move("bob", cmd(15)).expect("valid move");
    assert!(game.is_over());
    assert_eq!(game.outcome(), Outcome::Draw);
}

#[test]
fn test_double_move_removes_once_after_both_slides() {
    let mut game = new_match(board_with(&[
        ((0, 0), Color::Green),
        ((6, 6), Color::Green),
    ]));
    let removed = game
        .apply_double_move("ada", cmd(21), cmd(13))
        .expect("valid double move");
    assert_eq!(removed.count(Color::Green), 2);
    assert!(game.board().adjacent_tiles().is_empty());
    assert_eq!(game.outcome(), Outcome::Draw);
}

#[test]
fn test_illegal_moves_leave_the_board_alone() {
    let mut game = new_match(two_group_board());
    let before = *game.board();

    assert_eq!(
        game.apply_single_move("ada", cmd(7)),
        Err(MoveError::IllegalSingleMove(cmd(7)))
    );
    assert_eq!(
        game.apply_double_move("ada", cmd(21), cmd(13)),
        Err(MoveError::IllegalDoubleMove(cmd(21), cmd(13)))
    );
    assert_eq!(
        game.apply_single_move("eve", cmd(14)),
        Err(MoveError::NotAParticipant("eve".to_string()))
    );
    assert_eq!(game.board(), &before);
    assert_eq!(game.collected("ada").map(|c| c.total()), Some(0));
}

#[test]
fn test_no_moves_after_game_over() {
    let mut game = new_match(board_with(&[
        ((0, 0), Color::Green),
        ((1, 5), Color::Green),
    ]));
    game.apply_single_move("ada", cmd(15)).expect("valid move");
    assert_eq!(
        game.apply_single_move("bob", cmd(15)),
        Err(MoveError::GameOver)
    );
}
