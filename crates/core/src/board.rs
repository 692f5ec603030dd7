//! Board module - manages the token grid
//!
//! The board is an 8x8 grid where every cell holds exactly one [`Token`].
//! Uses a flat array for better cache locality and zero-allocation.
//! Coordinates: `(row, col)` with rows indexed top-to-bottom.
//!
//! A cell only holds the empty sentinel between a clear and the following
//! refill; a settled board never contains one.

use std::ops::Index;

use crate::types::{Color, Coord, Token, TokenId, CELL_COUNT, GRID_SIZE, MIN_RUN};

/// The game board - 8x8 tokens using flat array storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Flat array of tokens, row-major order (row * GRID_SIZE + col)
    cells: [Token; CELL_COUNT],
}

impl Board {
    /// Build a board by asking `f` for every cell in row-major order.
    pub fn from_fn(mut f: impl FnMut(Coord) -> Token) -> Self {
        Self {
            cells: std::array::from_fn(|i| f(Coord::from_index(i))),
        }
    }

    /// Build a board from row strings of color letters.
    ///
    /// Letters: `R`ed, `Y`ellow, `P`urple, `G`reen, `O`range, `B`lue, `.` empty.
    /// Whitespace is ignored. Token ids are assigned `1..=64` in row-major order.
    /// Returns `None` on an unknown letter or wrong dimensions.
    ///
    /// ```
    /// use tui_match3_core::Board;
    /// use tui_match3_core::types::{Color, Coord};
    ///
    /// let board = Board::parse(&[
    ///     "RYPG OBRY",
    ///     "YPGO BRYP",
    ///     "PGOB RYPG",
    ///     "GOBR YPGO",
    ///     "OBRY PGOB",
    ///     "BRYP GOBR",
    ///     "RYPG OBRY",
    ///     "YPGO BRYP",
    /// ]).unwrap();
    /// assert_eq!(board.color(Coord::new(0, 0)), Some(Color::Red));
    /// assert!(!board.has_run());
    /// ```
    pub fn parse(rows: &[&str]) -> Option<Self> {
        if rows.len() != GRID_SIZE as usize {
            return None;
        }
        let mut cells = [Token::empty(TokenId(0)); CELL_COUNT];
        for (r, line) in rows.iter().enumerate() {
            let mut c = 0usize;
            for ch in line.chars().filter(|ch| !ch.is_whitespace()) {
                if c >= GRID_SIZE as usize {
                    return None;
                }
                let idx = r * GRID_SIZE as usize + c;
                let id = TokenId(idx as u32 + 1);
                cells[idx] = match ch {
                    '.' => Token::empty(id),
                    _ => Token::new(color_from_letter(ch)?, id),
                };
                c += 1;
            }
            if c != GRID_SIZE as usize {
                return None;
            }
        }
        Some(Self { cells })
    }

    /// Get width/height of the board
    pub fn size(&self) -> u8 {
        GRID_SIZE
    }

    /// Get token at position, `None` if out of bounds
    pub fn get(&self, at: Coord) -> Option<&Token> {
        if !at.in_bounds() {
            return None;
        }
        Some(&self.cells[at.index()])
    }

    /// Set token at position.
    /// Returns false if out of bounds
    pub fn set(&mut self, at: Coord, token: Token) -> bool {
        if !at.in_bounds() {
            return false;
        }
        self.cells[at.index()] = token;
        true
    }

    /// Color at position (`None` for empty or out of bounds)
    pub fn color(&self, at: Coord) -> Option<Color> {
        self.get(at).and_then(|t| t.color)
    }

    /// Exchange two in-bounds cells
    pub fn swap_cells(&mut self, a: Coord, b: Coord) {
        if a.in_bounds() && b.in_bounds() {
            self.cells.swap(a.index(), b.index());
        }
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Token] {
        &self.cells
    }

    /// All coordinates in row-major order
    pub fn coords() -> impl Iterator<Item = Coord> {
        (0..CELL_COUNT).map(Coord::from_index)
    }

    /// First empty cell in row-major order
    pub fn first_empty(&self) -> Option<Coord> {
        self.cells
            .iter()
            .position(Token::is_empty)
            .map(Coord::from_index)
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|t| t.is_empty()).count()
    }

    /// Whether any row or column holds `MIN_RUN` consecutive equal colors.
    pub fn has_run(&self) -> bool {
        let n = GRID_SIZE as usize;
        let run_at = |cells: [usize; MIN_RUN]| {
            let first = self.cells[cells[0]].color;
            first.is_some() && cells.iter().all(|&i| self.cells[i].color == first)
        };
        for r in 0..n {
            for c in 0..=n - MIN_RUN {
                let h: [usize; MIN_RUN] = std::array::from_fn(|k| r * n + c + k);
                let v: [usize; MIN_RUN] = std::array::from_fn(|k| (c + k) * n + r);
                if run_at(h) || run_at(v) {
                    return true;
                }
            }
        }
        false
    }

    /// Token-for-token equality ignoring identities
    pub fn same_layout(&self, other: &Board) -> bool {
        self.cells
            .iter()
            .zip(other.cells.iter())
            .all(|(a, b)| a.same_content(b))
    }

    /// Largest token id on the board
    pub fn max_id(&self) -> TokenId {
        self.cells.iter().map(|t| t.id).max().unwrap_or_default()
    }

    /// Write compact cell codes (see [`Token::code`]) into a grid
    pub fn write_u8_grid(&self, out: &mut [[u8; GRID_SIZE as usize]; GRID_SIZE as usize]) {
        let n = GRID_SIZE as usize;
        for (r, row) in out.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = self.cells[r * n + c].code();
            }
        }
    }
}

impl Index<Coord> for Board {
    type Output = Token;

    fn index(&self, at: Coord) -> &Token {
        &self.cells[at.index()]
    }
}

fn color_from_letter(ch: char) -> Option<Color> {
    match ch.to_ascii_uppercase() {
        'R' => Some(Color::Red),
        'Y' => Some(Color::Yellow),
        'P' => Some(Color::Purple),
        'G' => Some(Color::Green),
        'O' => Some(Color::Orange),
        'B' => Some(Color::Blue),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SpecialKind;

    const DIAGONAL: [&str; 8] = [
        "RYPGOBRY", "YPGOBRYP", "PGOBRYPG", "GOBRYPGO", "OBRYPGOB", "BRYPGOBR", "RYPGOBRY",
        "YPGOBRYP",
    ];

    #[test]
    fn test_parse_assigns_row_major_ids() {
        let board = Board::parse(&DIAGONAL).unwrap();
        assert_eq!(board[Coord::new(0, 0)].id, TokenId(1));
        assert_eq!(board[Coord::new(1, 0)].id, TokenId(9));
        assert_eq!(board.max_id(), TokenId(64));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Board::parse(&DIAGONAL[..7]).is_none());
        let mut rows = DIAGONAL;
        rows[3] = "GOBRYPGX";
        assert!(Board::parse(&rows).is_none());
        rows[3] = "GOBRYPG";
        assert!(Board::parse(&rows).is_none());
    }

    #[test]
    fn test_get_and_set_bounds() {
        let mut board = Board::parse(&DIAGONAL).unwrap();
        assert!(board.get(Coord::new(8, 0)).is_none());
        assert!(!board.set(Coord::new(0, 8), Token::empty(TokenId(99))));
        assert!(board.set(Coord::new(2, 2), Token::empty(TokenId(99))));
        assert_eq!(board.first_empty(), Some(Coord::new(2, 2)));
        assert_eq!(board.empty_count(), 1);
    }

    #[test]
    fn test_has_run_detects_rows_and_columns() {
        let board = Board::parse(&DIAGONAL).unwrap();
        assert!(!board.has_run());

        let mut rows = DIAGONAL;
        rows[0] = "RRRGOBRY";
        assert!(Board::parse(&rows).unwrap().has_run());

        let mut board = Board::parse(&DIAGONAL).unwrap();
        // Column 0 reads R Y P ...; make rows 0..3 red.
        board.set(Coord::new(1, 0), Token::new(Color::Red, TokenId(100)));
        board.set(Coord::new(2, 0), Token::new(Color::Red, TokenId(101)));
        assert!(board.has_run());
    }

    #[test]
    fn test_empty_cells_never_form_a_run() {
        let mut rows = DIAGONAL;
        rows[4] = "...YPGOB";
        assert!(!Board::parse(&rows).unwrap().has_run());
    }

    #[test]
    fn test_same_layout_ignores_ids() {
        let a = Board::parse(&DIAGONAL).unwrap();
        let mut b = a.clone();
        let t = b[Coord::new(5, 5)];
        b.set(Coord::new(5, 5), Token::new(t.color.unwrap(), TokenId(500)));
        assert!(a.same_layout(&b));
        assert_ne!(a, b);

        b.set(
            Coord::new(5, 5),
            Token::special(t.color.unwrap(), SpecialKind::RowClear, TokenId(501)),
        );
        assert!(!a.same_layout(&b));
    }

    #[test]
    fn test_swap_cells() {
        let mut board = Board::parse(&DIAGONAL).unwrap();
        let a = board[Coord::new(3, 3)];
        let b = board[Coord::new(3, 4)];
        board.swap_cells(Coord::new(3, 3), Coord::new(3, 4));
        assert_eq!(board[Coord::new(3, 3)], b);
        assert_eq!(board[Coord::new(3, 4)], a);
    }

    #[test]
    fn test_u8_grid_matches_codes() {
        let board = Board::parse(&DIAGONAL).unwrap();
        let mut grid = [[0u8; 8]; 8];
        board.write_u8_grid(&mut grid);
        assert_eq!(grid[0][0], Color::Red.code());
        assert_eq!(grid[7][7], Color::Purple.code());
    }
}
