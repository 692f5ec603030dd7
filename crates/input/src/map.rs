//! Key mapping from terminal events to board inputs.

use crate::types::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Move the cursor, or swap towards this side while a cell is selected
    Move(Direction),
    /// Select (or deselect) the cell under the cursor
    Select,
    Hint,
    NextLevel,
    Restart,
}

/// Map keyboard input to board inputs.
pub fn handle_key_event(key: KeyEvent) -> Option<KeyInput> {
    match key.code {
        // Movement
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(KeyInput::Move(Direction::Left))
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(KeyInput::Move(Direction::Right))
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') | KeyCode::Char('w') | KeyCode::Char('W') => {
            Some(KeyInput::Move(Direction::Up))
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(KeyInput::Move(Direction::Down))
        }

        // Selection
        KeyCode::Char(' ') | KeyCode::Enter => Some(KeyInput::Select),

        // Session
        KeyCode::Char('?') => Some(KeyInput::Hint),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(KeyInput::NextLevel),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(KeyInput::Restart),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
