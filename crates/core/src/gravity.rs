//! Gravity module - column compaction and refill
//!
//! Per column, non-empty tokens slide down preserving their order; the cells
//! left at the top receive fresh tokens from the [`TokenSource`]. Refills are
//! drawn column by column, top to bottom.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::error::EngineError;
use crate::rng::{ColorSource, TokenSource};
use crate::types::{Coord, Token, GRID_SIZE};

/// Compact every column downward without refilling.
///
/// Returns the number of empty cells left at the column tops.
pub fn collapse(board: &mut Board) -> usize {
    let n = GRID_SIZE;
    let mut holes = 0;
    for c in 0..n {
        let mut stack: ArrayVec<Token, { GRID_SIZE as usize }> = ArrayVec::new();
        let mut empties: ArrayVec<Token, { GRID_SIZE as usize }> = ArrayVec::new();
        for r in 0..n {
            let token = board[Coord::new(r, c)];
            if token.is_empty() {
                empties.push(token);
            } else {
                stack.push(token);
            }
        }
        holes += empties.len();
        let column = empties.iter().chain(stack.iter());
        for (r, token) in column.enumerate() {
            board.set(Coord::new(r as u8, c), *token);
        }
    }
    holes
}

/// Collapse, then fill every top hole with a fresh token.
///
/// Returns the refilled coordinates in column-major order. Fails if any cell
/// is still empty afterwards.
pub fn apply_gravity<C: ColorSource>(
    board: &mut Board,
    tokens: &mut TokenSource<C>,
) -> Result<Vec<Coord>, EngineError> {
    collapse(board);

    let mut refilled = Vec::new();
    for c in 0..GRID_SIZE {
        for r in 0..GRID_SIZE {
            let at = Coord::new(r, c);
            if !board[at].is_empty() {
                break;
            }
            board.set(at, tokens.fresh());
            refilled.push(at);
        }
    }

    if board.first_empty().is_some() {
        return Err(EngineError::InvariantViolation(
            "empty cell left after refill",
        ));
    }
    Ok(refilled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededColors;
    use crate::types::{Color, TokenId};

    const QUIET: [&str; 8] = [
        "RYPGOBRY", "YPGOBRYP", "PGOBRYPG", "GOBRYPGO", "OBRYPGOB", "BRYPGOBR", "RYPGOBRY",
        "YPGOBRYP",
    ];

    fn tokens() -> TokenSource<SeededColors> {
        TokenSource::resume_after(SeededColors::new(9), TokenId(64))
    }

    #[test]
    fn test_collapse_preserves_column_order() {
        let mut rows = QUIET;
        rows[3] = ".OBRYPGO";
        rows[5] = ".RYPGOBR";
        let mut board = Board::parse(&rows).unwrap();
        let column_before: Vec<_> = (0..8)
            .map(|r| board[Coord::new(r, 0)])
            .filter(|t| !t.is_empty())
            .collect();

        assert_eq!(collapse(&mut board), 2);
        assert!(board[Coord::new(0, 0)].is_empty());
        assert!(board[Coord::new(1, 0)].is_empty());
        let column_after: Vec<_> = (2..8).map(|r| board[Coord::new(r, 0)]).collect();
        assert_eq!(column_before, column_after);
    }

    #[test]
    fn test_refill_fills_top_cells_only() {
        let mut rows = QUIET;
        rows[0] = "...GOBRY";
        let mut board = Board::parse(&rows).unwrap();
        let below = board[Coord::new(1, 0)];

        let refilled = apply_gravity(&mut board, &mut tokens()).unwrap();
        assert_eq!(
            refilled,
            vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)]
        );
        assert_eq!(board.empty_count(), 0);
        assert_eq!(board[Coord::new(1, 0)], below);
    }

    #[test]
    fn test_bottom_hole_shifts_whole_column() {
        let mut rows = QUIET;
        rows[7] = "YPGOBRY.";
        let mut board = Board::parse(&rows).unwrap();
        let top = board[Coord::new(0, 7)];

        let refilled = apply_gravity(&mut board, &mut tokens()).unwrap();
        assert_eq!(refilled, vec![Coord::new(0, 7)]);
        assert_eq!(board[Coord::new(1, 7)], top);
        assert_eq!(board[Coord::new(7, 7)].color, Some(Color::Yellow));
        assert!(board[Coord::new(0, 7)].id > TokenId(64));
    }

    #[test]
    fn test_settled_board_is_untouched() {
        let mut board = Board::parse(&QUIET).unwrap();
        let before = board.clone();
        let refilled = apply_gravity(&mut board, &mut tokens()).unwrap();
        assert!(refilled.is_empty());
        assert_eq!(board, before);
    }
}
