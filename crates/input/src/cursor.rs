//! Cursor and selection state for keyboard and click play.
//!
//! - with nothing selected, `Move` walks the cursor (clamped to the board)
//! - `Select` marks the cell under the cursor
//! - with a cell selected, `Move` or selecting an adjacent cell emits a swap
//!   and clears the selection
//! - selecting the selected cell again deselects it; selecting a distant cell
//!   moves the selection there

use crate::map::KeyInput;
use crate::types::{Coord, Direction, Swap, GRID_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pos: Coord,
    selected: Option<Coord>,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor {
    /// Cursor at the board centre, nothing selected.
    pub fn new() -> Self {
        let mid = GRID_SIZE / 2;
        Self {
            pos: Coord::new(mid, mid),
            selected: None,
        }
    }

    pub fn pos(&self) -> Coord {
        self.pos
    }

    pub fn selected(&self) -> Option<Coord> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Place the cursor directly (hints, mouse hover).
    pub fn set_pos(&mut self, at: Coord) {
        if at.in_bounds() {
            self.pos = at;
        }
    }

    /// Feed a key input; returns a swap request when one is complete.
    ///
    /// Session keys (`Hint`, `NextLevel`, `Restart`) are ignored here.
    pub fn apply(&mut self, input: KeyInput) -> Option<Swap> {
        match input {
            KeyInput::Move(dir) => self.step(dir),
            KeyInput::Select => self.pick(self.pos),
            KeyInput::Hint | KeyInput::NextLevel | KeyInput::Restart => None,
        }
    }

    /// Select a cell by pointer click.
    pub fn click(&mut self, at: Coord) -> Option<Swap> {
        if !at.in_bounds() {
            return None;
        }
        self.pos = at;
        self.pick(at)
    }

    fn step(&mut self, dir: Direction) -> Option<Swap> {
        match self.selected {
            Some(from) => {
                let to = from.neighbor(dir)?;
                self.selected = None;
                self.pos = to;
                Some(Swap::new(from, to))
            }
            None => {
                if let Some(next) = self.pos.neighbor(dir) {
                    self.pos = next;
                }
                None
            }
        }
    }

    fn pick(&mut self, at: Coord) -> Option<Swap> {
        match self.selected {
            Some(from) if from == at => {
                self.selected = None;
                None
            }
            Some(from) if from.is_adjacent(at) => {
                self.selected = None;
                Some(Swap::new(from, at))
            }
            _ => {
                self.selected = Some(at);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_is_clamped() {
        let mut cursor = Cursor::new();
        for _ in 0..20 {
            cursor.apply(KeyInput::Move(Direction::Up));
        }
        assert_eq!(cursor.pos().row, 0);
        for _ in 0..20 {
            cursor.apply(KeyInput::Move(Direction::Right));
        }
        assert_eq!(cursor.pos(), Coord::new(0, 7));
    }

    #[test]
    fn test_select_then_direction_swaps() {
        let mut cursor = Cursor::new();
        assert_eq!(cursor.apply(KeyInput::Select), None);
        assert_eq!(cursor.selected(), Some(Coord::new(4, 4)));

        let swap = cursor.apply(KeyInput::Move(Direction::Left));
        assert_eq!(swap, Some(Swap::new(Coord::new(4, 4), Coord::new(4, 3))));
        assert_eq!(cursor.selected(), None);
        assert_eq!(cursor.pos(), Coord::new(4, 3));
    }

    #[test]
    fn test_direction_off_board_keeps_selection() {
        let mut cursor = Cursor::new();
        cursor.set_pos(Coord::new(0, 0));
        cursor.apply(KeyInput::Select);
        assert_eq!(cursor.apply(KeyInput::Move(Direction::Up)), None);
        assert_eq!(cursor.selected(), Some(Coord::new(0, 0)));
    }

    #[test]
    fn test_click_pairs() {
        let mut cursor = Cursor::new();
        assert_eq!(cursor.click(Coord::new(2, 2)), None);
        // Same cell deselects.
        assert_eq!(cursor.click(Coord::new(2, 2)), None);
        assert_eq!(cursor.selected(), None);

        cursor.click(Coord::new(2, 2));
        // Distant cell moves the selection.
        assert_eq!(cursor.click(Coord::new(5, 5)), None);
        assert_eq!(cursor.selected(), Some(Coord::new(5, 5)));

        assert_eq!(
            cursor.click(Coord::new(6, 5)),
            Some(Swap::new(Coord::new(5, 5), Coord::new(6, 5)))
        );
        assert_eq!(cursor.click(Coord::new(9, 9)), None);
    }

    #[test]
    fn test_session_keys_do_not_touch_cursor() {
        let mut cursor = Cursor::new();
        let before = cursor;
        assert_eq!(cursor.apply(KeyInput::Restart), None);
        assert_eq!(cursor, before);
    }
}
