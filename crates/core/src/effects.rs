//! Effects module - special-token effects, clearing and promotion
//!
//! One resolve pass over a match set happens in three steps:
//!
//! 1. every special token among the matched cells is collected as a
//!    [`TriggeredEffect`] (before anything fires)
//! 2. the union of all effect areas plus the matched cells is emptied
//! 3. a match of four or more cells promotes its representative cell into a
//!    new special token, placed after the clear
//!
//! Effect areas are computed on the board as it was at the start of the pass,
//! so the order specials fire in never changes the outcome. A special that is
//! caught in another special's area but is not itself matched does not fire.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::detect::MatchSet;
use crate::rng::{ColorSource, TokenSource};
use crate::types::{Color, Coord, SpecialKind, CELL_COUNT, GRID_SIZE};

/// A special token that fired during a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggeredEffect {
    pub at: Coord,
    pub kind: SpecialKind,
    pub color: Color,
}

/// A special token created by a large match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    pub at: Coord,
    pub color: Color,
    pub kind: SpecialKind,
}

/// What a single resolve pass did to the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassResolution {
    pub triggered: Vec<TriggeredEffect>,
    /// Emptied cells in row-major order (the promoted cell is not listed)
    pub cleared: Vec<Coord>,
    pub promoted: Option<Promotion>,
}

/// Specials among the matched cells, in match order.
pub fn collect_triggers(board: &Board, set: &MatchSet) -> Vec<TriggeredEffect> {
    set.iter()
        .filter_map(|at| {
            let token = board.get(at)?;
            let color = token.color?;
            token.special.is_special().then_some(TriggeredEffect {
                at,
                kind: token.special,
                color,
            })
        })
        .collect()
}

/// Mark every cell the effect empties.
pub fn mark_effect_area(board: &Board, effect: &TriggeredEffect, mask: &mut [bool; CELL_COUNT]) {
    let n = GRID_SIZE;
    match effect.kind {
        SpecialKind::None => {}
        SpecialKind::RowClear => {
            for c in 0..n {
                mask[Coord::new(effect.at.row, c).index()] = true;
            }
        }
        SpecialKind::ColumnClear => {
            for r in 0..n {
                mask[Coord::new(r, effect.at.col).index()] = true;
            }
        }
        SpecialKind::AreaClear => {
            for dr in -1i16..=1 {
                for dc in -1i16..=1 {
                    if let Some(at) =
                        Coord::checked(effect.at.row as i16 + dr, effect.at.col as i16 + dc)
                    {
                        mask[at.index()] = true;
                    }
                }
            }
        }
        SpecialKind::ColorClear => {
            for at in Board::coords() {
                if board.color(at) == Some(effect.color) {
                    mask[at.index()] = true;
                }
            }
        }
    }
}

/// Special kind earned by a match of this shape, if any.
///
/// - 4 cells: row-clear when all share a row, column-clear otherwise
/// - 5 cells: area-clear
/// - 6 or more: color-clear
pub fn promotion_kind(set: &MatchSet) -> SpecialKind {
    match set.len() {
        0..=3 => SpecialKind::None,
        4 if set.shares_row() => SpecialKind::RowClear,
        4 => SpecialKind::ColumnClear,
        5 => SpecialKind::AreaClear,
        _ => SpecialKind::ColorClear,
    }
}

/// Where and what a match promotes, using the representative's pre-pass color.
pub fn plan_promotion(board: &Board, set: &MatchSet) -> Option<Promotion> {
    let kind = promotion_kind(set);
    if !kind.is_special() {
        return None;
    }
    let at = set.representative()?;
    let color = board.color(at)?;
    Some(Promotion { at, color, kind })
}

/// Run one resolve pass in place: fire specials, clear, promote.
pub fn resolve_pass<C: ColorSource>(
    board: &mut Board,
    set: &MatchSet,
    tokens: &mut TokenSource<C>,
) -> PassResolution {
    let triggered = collect_triggers(board, set);
    let promoted = plan_promotion(board, set);

    let mut mask = [false; CELL_COUNT];
    for effect in &triggered {
        mark_effect_area(board, effect, &mut mask);
    }
    for at in set.iter() {
        mask[at.index()] = true;
    }
    if let Some(p) = promoted {
        mask[p.at.index()] = false;
    }

    let mut cleared: ArrayVec<Coord, CELL_COUNT> = ArrayVec::new();
    for at in Board::coords() {
        if mask[at.index()] {
            board.set(at, tokens.empty());
            cleared.push(at);
        }
    }

    if let Some(p) = promoted {
        board.set(p.at, tokens.promoted(p.color, p.kind));
    }

    PassResolution {
        triggered,
        cleared: cleared.to_vec(),
        promoted,
    }
}
