//! Match detection.
//!
//! [`detect`] scans a settled board for four shape classes, in order:
//!
//! 1. horizontal windows of three equal colors (row-major)
//! 2. vertical windows of three (row-major by top cell)
//! 3. L-shapes: a horizontal three whose first cell also starts a vertical
//!    three downward
//! 4. T-shapes: a horizontal three whose middle cell starts a vertical three
//!    downward
//!
//! Every member coordinate lands in a [`MatchSet`] exactly once, in order of
//! first detection. Runs longer than three are covered by overlapping windows.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::error::EngineError;
use crate::types::{Color, Coord, CELL_COUNT, GRID_SIZE};

/// Ordered set of matched coordinates (no duplicates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSet {
    coords: ArrayVec<Coord, CELL_COUNT>,
    seen: [bool; CELL_COUNT],
}

impl MatchSet {
    pub fn new() -> Self {
        Self {
            coords: ArrayVec::new(),
            seen: [false; CELL_COUNT],
        }
    }

    /// Insert a coordinate; returns false if it was already present.
    pub fn insert(&mut self, at: Coord) -> bool {
        let i = at.index();
        if self.seen[i] {
            return false;
        }
        self.seen[i] = true;
        self.coords.push(at);
        true
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.in_bounds() && self.seen[at.index()]
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Coordinates in detection order
    pub fn as_slice(&self) -> &[Coord] {
        &self.coords
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.coords.iter().copied()
    }

    /// Middle element by detection order (index `len / 2`).
    pub fn representative(&self) -> Option<Coord> {
        self.coords.get(self.coords.len() / 2).copied()
    }

    /// Whether every member lies on one row
    pub fn shares_row(&self) -> bool {
        match self.coords.first() {
            Some(first) => self.coords.iter().all(|c| c.row == first.row),
            None => false,
        }
    }
}

impl Default for MatchSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan a settled board for matches.
///
/// Fails with an invariant violation if the board still holds an empty cell:
/// detection only ever runs before a swap is resolved or after a refill.
pub fn detect(board: &Board) -> Result<MatchSet, EngineError> {
    if board.first_empty().is_some() {
        return Err(EngineError::InvariantViolation(
            "match detection on a board with empty cells",
        ));
    }

    let n = GRID_SIZE;
    let mut set = MatchSet::new();

    // Horizontal
    for r in 0..n {
        for c in 0..n - 2 {
            let cells = [Coord::new(r, c), Coord::new(r, c + 1), Coord::new(r, c + 2)];
            if uniform(board, &cells).is_some() {
                cells.iter().for_each(|&at| {
                    set.insert(at);
                });
            }
        }
    }

    // Vertical
    for r in 0..n - 2 {
        for c in 0..n {
            let cells = [Coord::new(r, c), Coord::new(r + 1, c), Coord::new(r + 2, c)];
            if uniform(board, &cells).is_some() {
                cells.iter().for_each(|&at| {
                    set.insert(at);
                });
            }
        }
    }

    // L and T shapes
    for r in 0..n - 2 {
        for c in 0..n - 2 {
            let l_shape = [
                Coord::new(r, c),
                Coord::new(r, c + 1),
                Coord::new(r, c + 2),
                Coord::new(r + 1, c),
                Coord::new(r + 2, c),
            ];
            if uniform(board, &l_shape).is_some() {
                l_shape.iter().for_each(|&at| {
                    set.insert(at);
                });
            }

            let t_shape = [
                Coord::new(r, c),
                Coord::new(r, c + 1),
                Coord::new(r, c + 2),
                Coord::new(r + 1, c + 1),
                Coord::new(r + 2, c + 1),
            ];
            if uniform(board, &t_shape).is_some() {
                t_shape.iter().for_each(|&at| {
                    set.insert(at);
                });
            }
        }
    }

    Ok(set)
}

/// Shared color if every cell carries the same non-empty color.
fn uniform(board: &Board, cells: &[Coord]) -> Option<Color> {
    let first = board.color(*cells.first()?)?;
    cells[1..]
        .iter()
        .all(|&at| board.color(at) == Some(first))
        .then_some(first)
}
