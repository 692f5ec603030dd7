//! Keyboard and pointer input driving a session end to end

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use tui_match3::core::{Board, GameSession, SeededColors};
use tui_match3::input::{handle_key_event, should_quit, Cursor, GestureTracker, KeyInput};
use tui_match3::term::{BoardView, Viewport};
use tui_match3::types::{Coord, Swap, LEVELS};

const QUIET: [&str; 8] = [
    "RYPGOBRY", "YPGOBRYP", "PGOBRYPG", "GOBRYPGO", "OBRYPGOB", "BRYPGOBR", "RYPGOBRY",
    "YPGOBRYP",
];

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn press(cursor: &mut Cursor, code: KeyCode) -> Option<Swap> {
    handle_key_event(key(code)).and_then(|input| cursor.apply(input))
}

fn session() -> GameSession {
    let mut rows = QUIET;
    rows[3] = "GYYRYPGO";
    GameSession::from_board(Board::parse(&rows).unwrap(), &LEVELS, 0, SeededColors::new(3))
        .unwrap()
}

#[test]
fn test_keyboard_select_and_swap_scores() {
    let mut cursor = Cursor::new();
    // Centre is (4,4); walk to (3,3).
    assert!(press(&mut cursor, KeyCode::Up).is_none());
    assert!(press(&mut cursor, KeyCode::Char('h')).is_none());
    assert_eq!(cursor.pos(), Coord::new(3, 3));

    assert!(press(&mut cursor, KeyCode::Char(' ')).is_none());
    assert_eq!(cursor.selected(), Some(Coord::new(3, 3)));

    let swap = press(&mut cursor, KeyCode::Right).unwrap();
    assert_eq!(swap, Swap::new(Coord::new(3, 3), Coord::new(3, 4)));
    assert_eq!(cursor.selected(), None);

    let out = session().apply_swap(swap).unwrap();
    assert_eq!(out.session.score(), 30);
}

#[test]
fn test_session_keys_leave_cursor_alone() {
    let mut cursor = Cursor::new();
    for code in [KeyCode::Char('?'), KeyCode::Char('n'), KeyCode::Char('r')] {
        let input = handle_key_event(key(code)).unwrap();
        assert!(matches!(
            input,
            KeyInput::Hint | KeyInput::NextLevel | KeyInput::Restart
        ));
        assert!(cursor.apply(input).is_none());
    }
    assert_eq!(cursor, Cursor::new());
}

#[test]
fn test_quit_keys() {
    assert!(should_quit(key(KeyCode::Char('q'))));
    assert!(should_quit(KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::CONTROL
    )));
    assert!(!should_quit(key(KeyCode::Char('c'))));
}

#[test]
fn test_click_two_adjacent_cells_swaps() {
    let view = BoardView::default();
    let vp = Viewport::new(60, 20);
    let mut cursor = Cursor::new();

    let first = view.cell_at(vp, 14, 8).unwrap();
    let second = view.cell_at(vp, 18, 8).unwrap();
    assert_eq!(first, Coord::new(3, 3));
    assert_eq!(second, Coord::new(3, 4));

    assert!(cursor.click(first).is_none());
    let swap = cursor.click(second).unwrap();
    let out = session().apply_swap(swap).unwrap();
    assert!(!out.trace.reverted());
}

#[test]
fn test_drag_swaps_with_neighbour() {
    let mut gesture = GestureTracker::default();
    gesture.press(Coord::new(3, 3), 100, 100);
    assert!(gesture.is_pressed());
    let swap = gesture.release(140, 110).unwrap();
    assert_eq!(swap, Swap::new(Coord::new(3, 3), Coord::new(3, 4)));
    assert!(!gesture.is_pressed());

    let out = session().apply_swap(swap).unwrap();
    assert_eq!(out.session.moves_remaining(), LEVELS[0].move_budget - 1);
}

#[test]
fn test_short_or_off_board_drag_does_nothing() {
    let mut gesture = GestureTracker::default();
    gesture.press(Coord::new(3, 3), 0, 0);
    assert!(gesture.release(30, -30).is_none());

    gesture.press(Coord::new(0, 0), 0, 0);
    assert!(gesture.release(0, -100).is_none());

    // Release without a press.
    assert!(gesture.release(500, 500).is_none());
}
