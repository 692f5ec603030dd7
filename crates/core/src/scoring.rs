//! Scoring module - points for resolve passes
//!
//! A pass scores `POINTS_PER_CELL` for every cell in its match set, plus
//! `PROMOTION_BONUS` when it promotes a special token. Cells emptied only by
//! special effects earn nothing.

use crate::types::{POINTS_PER_CELL, PROMOTION_BONUS};

/// Score calculation result for one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassScore {
    /// Points for the matched cells.
    pub base: u32,
    /// Promotion bonus added on top of `base`.
    pub bonus: u32,
    pub total: u32,
}

/// Calculate the score for a pass.
///
/// # Examples
///
/// ```
/// use tui_match3_core::scoring::pass_score;
///
/// assert_eq!(pass_score(3, false).total, 30);
/// assert_eq!(pass_score(4, true).total, 90);
/// ```
pub fn pass_score(matched: usize, promoted: bool) -> PassScore {
    let base = POINTS_PER_CELL.saturating_mul(matched as u32);
    let bonus = if promoted { PROMOTION_BONUS } else { 0 };
    PassScore {
        base,
        bonus,
        total: base.saturating_add(bonus),
    }
}

/// Level target reached.
pub fn meets_target(score: u32, target: u32) -> bool {
    score >= target
}
