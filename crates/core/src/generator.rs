//! Generator module - initial boards free of matches
//!
//! Every cell is filled from the color source, then the grid is swept
//! row-major: a cell whose two left neighbours or two upper neighbours share
//! its color is rerolled. Sweeps repeat until one completes without a reroll.

use crate::board::Board;
use crate::error::EngineError;
use crate::rng::{ColorSource, SeededColors, TokenSource};
use crate::types::{Color, Coord};

/// Upper bound on reroll sweeps before generation gives up.
pub const MAX_GENERATION_PASSES: u32 = 100;

/// Generate a match-free board.
pub fn generate_board<C: ColorSource>(tokens: &mut TokenSource<C>) -> Result<Board, EngineError> {
    let mut board = Board::from_fn(|_| tokens.fresh());

    for pass in 1..=MAX_GENERATION_PASSES {
        let mut rerolled = 0u32;
        for at in Board::coords() {
            if completes_run(&board, at) {
                board.set(at, tokens.fresh());
                rerolled += 1;
            }
        }
        if rerolled == 0 {
            tracing::trace!(passes = pass, "board generated");
            return Ok(board);
        }
    }

    Err(EngineError::Generation {
        passes: MAX_GENERATION_PASSES,
    })
}

/// Generate from a restricted palette with a seeded source.
///
/// # Examples
///
/// ```
/// use tui_match3_core::generator::generate;
/// use tui_match3_core::types::Color;
///
/// let board = generate(&Color::ALL, 42).unwrap();
/// assert!(!board.has_run());
/// assert!(generate(&[], 42).is_err());
/// ```
pub fn generate(palette: &[Color], seed: u64) -> Result<Board, EngineError> {
    let colors = SeededColors::with_palette(seed, palette)?;
    generate_board(&mut TokenSource::new(colors))
}

/// Whether `at` is the third cell of a run ending at it, leftward or upward.
fn completes_run(board: &Board, at: Coord) -> bool {
    let Some(color) = board.color(at) else {
        return false;
    };
    let left = at.col >= 2
        && board.color(Coord::new(at.row, at.col - 1)) == Some(color)
        && board.color(Coord::new(at.row, at.col - 2)) == Some(color);
    let up = at.row >= 2
        && board.color(Coord::new(at.row - 1, at.col)) == Some(color)
        && board.color(Coord::new(at.row - 2, at.col)) == Some(color);
    left || up
}
