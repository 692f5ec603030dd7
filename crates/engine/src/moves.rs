use tui_match3_core::effects::promotion_kind;
use tui_match3_core::{detect, Board};
use tui_match3_types::{Coord, Direction, SpecialKind, Swap, GRID_SIZE};

/// A productive swap and what its first pass would match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub swap: Swap,
    /// Size of the immediate match set
    pub matched: usize,
    /// Special the first pass would promote
    pub promotes: SpecialKind,
}

/// Evaluate a single swap without committing it.
///
/// Returns `None` for invalid swaps, swaps that match nothing, and boards
/// that are not settled.
pub fn score_move(board: &Board, swap: Swap) -> Option<ScoredMove> {
    if !swap.is_valid() {
        return None;
    }
    let mut probe = board.clone();
    probe.swap_cells(swap.from, swap.to);
    let set = detect(&probe).ok()?;
    if set.is_empty() {
        return None;
    }
    Some(ScoredMove {
        swap,
        matched: set.len(),
        promotes: promotion_kind(&set),
    })
}

fn candidates() -> impl Iterator<Item = Swap> {
    (0..GRID_SIZE).flat_map(|row| {
        (0..GRID_SIZE).flat_map(move |col| {
            let from = Coord::new(row, col);
            [Direction::Right, Direction::Down]
                .into_iter()
                .filter_map(move |dir| from.neighbor(dir).map(|to| Swap::new(from, to)))
        })
    })
}

/// Every swap that produces a match, row-major, right neighbour first.
pub fn find_moves(board: &Board) -> Vec<Swap> {
    candidates()
        .filter(|&swap| score_move(board, swap).is_some())
        .collect()
}

/// The swap with the largest immediate match (first found on ties).
pub fn best_move(board: &Board) -> Option<ScoredMove> {
    candidates()
        .filter_map(|swap| score_move(board, swap))
        .fold(None, |best: Option<ScoredMove>, m| match best {
            Some(b) if b.matched >= m.matched => Some(b),
            _ => Some(m),
        })
}

pub fn has_moves(board: &Board) -> bool {
    candidates().any(|swap| score_move(board, swap).is_some())
}
