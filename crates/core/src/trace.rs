//! Trace module - every intermediate board of a settle cycle
//!
//! The engine resolves a swap in one atomic transition; the [`SettleTrace`]
//! it returns lets presentation layers replay the cycle at their own pace
//! (swap, highlight, clear, fall, refill, repeat).

use crate::board::Board;
use crate::effects::{Promotion, TriggeredEffect};
use crate::scoring::PassScore;
use crate::types::{Coord, GameStatus, Swap};

/// One resolve pass: match, effects, clear, promote, gravity, refill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettleStep {
    /// 1-based pass number within the cycle
    pub pass: u32,
    /// Match set in detection order
    pub matched: Vec<Coord>,
    pub triggered: Vec<TriggeredEffect>,
    /// Emptied cells, row-major (the promoted cell is not listed)
    pub cleared: Vec<Coord>,
    pub promoted: Option<Promotion>,
    pub score: PassScore,
    /// Board after the clear and promotion, before gravity
    pub cleared_board: Board,
    /// Cells that received fresh tokens, column by column
    pub refilled: Vec<Coord>,
    /// Board after gravity and refill
    pub board: Board,
}

/// How a swap attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// No match: the swap was undone (the move is still spent).
    Reverted,
    /// At least one pass resolved.
    Settled,
}

impl SettleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettleOutcome::Reverted => "reverted",
            SettleOutcome::Settled => "settled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettleTrace {
    pub swap: Swap,
    /// Board before the swap
    pub before: Board,
    /// Board right after the tentative swap
    pub swapped: Board,
    pub steps: Vec<SettleStep>,
    pub outcome: SettleOutcome,
    /// Session status once the cycle reached its terminal state
    pub status: GameStatus,
}

impl SettleTrace {
    pub fn reverted(&self) -> bool {
        self.outcome == SettleOutcome::Reverted
    }

    /// Sum of all pass scores.
    pub fn score_gained(&self) -> u32 {
        self.steps
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.score.total))
    }

    /// Cells emptied over all passes
    pub fn total_cleared(&self) -> usize {
        self.steps.iter().map(|s| s.cleared.len()).sum()
    }

    pub fn promotions(&self) -> impl Iterator<Item = &Promotion> + '_ {
        self.steps.iter().filter_map(|s| s.promoted.as_ref())
    }

    /// Board at the end of the cycle
    pub fn final_board(&self) -> &Board {
        match self.steps.last() {
            Some(step) => &step.board,
            None => &self.before,
        }
    }
}
