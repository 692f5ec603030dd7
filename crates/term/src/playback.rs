//! Playback: paces a [`SettleTrace`] into timed frames.
//!
//! The engine resolves a swap instantly; this module derives what the screen
//! should show in between:
//!
//! | Frame | Board | Marked cells | Duration |
//! |-------|-------|--------------|----------|
//! | swap | after the tentative swap | swapping pair | `SWAP_ANIM_MS` |
//! | swap back (reverted only) | before the swap | swapping pair | `SWAP_ANIM_MS` |
//! | match, per pass | before the clear | matched + effect cells | `MATCH_ANIM_MS` |
//! | clear, per pass | after clear/promotion | promoted cell | `MATCH_ANIM_MS` |
//! | refill, per pass | after gravity | refilled cells | `CASCADE_ANIM_MS` between passes |

use crate::core::{Board, SettleTrace};
use crate::types::{
    Coord, CASCADE_ANIM_MS, CELL_COUNT, GRID_SIZE, MATCH_ANIM_MS, SWAP_ANIM_MS,
};

/// Cell grid in snapshot encoding.
pub type Cells = [[u8; GRID_SIZE as usize]; GRID_SIZE as usize];

/// Which set a marked cell belongs to (drives its styling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Swapping,
    Matching,
    Cleared,
    Refilled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub cells: Cells,
    pub marked: [bool; CELL_COUNT],
    /// Score gained so far in this cycle
    pub score_gained: u32,
    pub duration_ms: u32,
}

impl Frame {
    fn new(kind: FrameKind, board: &Board, score_gained: u32, duration_ms: u32) -> Self {
        let mut cells = [[0u8; GRID_SIZE as usize]; GRID_SIZE as usize];
        board.write_u8_grid(&mut cells);
        Self {
            kind,
            cells,
            marked: [false; CELL_COUNT],
            score_gained,
            duration_ms,
        }
    }

    fn mark(mut self, coords: impl IntoIterator<Item = Coord>) -> Self {
        for at in coords {
            if at.in_bounds() {
                self.marked[at.index()] = true;
            }
        }
        self
    }

    pub fn is_marked(&self, at: Coord) -> bool {
        at.in_bounds() && self.marked[at.index()]
    }
}

/// Expand a trace into frames.
pub fn frames_for(trace: &SettleTrace) -> Vec<Frame> {
    let pair = [trace.swap.from, trace.swap.to];
    let mut frames = vec![Frame::new(FrameKind::Swapping, &trace.swapped, 0, SWAP_ANIM_MS).mark(pair)];

    if trace.reverted() {
        frames.push(Frame::new(FrameKind::Swapping, &trace.before, 0, SWAP_ANIM_MS).mark(pair));
        return frames;
    }

    let mut gained = 0u32;
    let mut shown = &trace.swapped;
    let last = trace.steps.len().saturating_sub(1);
    for (i, step) in trace.steps.iter().enumerate() {
        frames.push(
            Frame::new(FrameKind::Matching, shown, gained, MATCH_ANIM_MS)
                .mark(step.matched.iter().copied())
                .mark(step.cleared.iter().copied()),
        );
        gained = gained.saturating_add(step.score.total);
        frames.push(
            Frame::new(FrameKind::Cleared, &step.cleared_board, gained, MATCH_ANIM_MS)
                .mark(step.promoted.map(|p| p.at)),
        );
        let pause = if i < last { CASCADE_ANIM_MS } else { 0 };
        frames.push(
            Frame::new(FrameKind::Refilled, &step.board, gained, pause)
                .mark(step.refilled.iter().copied()),
        );
        shown = &step.board;
    }
    frames
}

/// Steps through frames as wall-clock time passes.
#[derive(Debug, Clone, Default)]
pub struct Playback {
    frames: Vec<Frame>,
    index: usize,
    elapsed_ms: u32,
}

impl Playback {
    pub fn new(trace: &SettleTrace) -> Self {
        Self {
            frames: frames_for(trace),
            index: 0,
            elapsed_ms: 0,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame on screen now; `None` once playback is over.
    pub fn current(&self) -> Option<&Frame> {
        self.frames.get(self.index)
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.frames.len()
    }

    /// Advance the clock; may skip several short frames at once.
    pub fn tick(&mut self, dt_ms: u32) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        while let Some(frame) = self.frames.get(self.index) {
            if self.elapsed_ms < frame.duration_ms {
                break;
            }
            self.elapsed_ms -= frame.duration_ms;
            self.index += 1;
        }
    }

    /// Jump to the end (any key skips the animation).
    pub fn skip(&mut self) {
        self.index = self.frames.len();
        self.elapsed_ms = 0;
    }

    /// Total time the playback takes.
    pub fn total_ms(&self) -> u32 {
        self.frames.iter().map(|f| f.duration_ms).sum()
    }
}
