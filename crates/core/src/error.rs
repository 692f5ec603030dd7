//! Engine error taxonomy.
//!
//! Every fallible engine entry point returns [`EngineError`]. Only
//! [`EngineError::InvalidSwap`] and [`EngineError::NotPlayable`] are expected
//! during normal play; callers usually ignore them (a rejected swap changes
//! nothing). The rest are fatal for the attempt that produced them.

use crate::types::Coord;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid swap ({}, {}) -> ({}, {}): cells must be in bounds and adjacent", .from.row, .from.col, .to.row, .to.col)]
    InvalidSwap { from: Coord, to: Coord },

    #[error("board generation did not converge after {passes} passes")]
    Generation { passes: u32 },

    #[error("palette must contain at least one color")]
    EmptyPalette,

    #[error("invariant violated: {0}")]
    InvariantViolation(&'static str),

    #[error("session is not playable")]
    NotPlayable,

    #[error("level {0} is not configured")]
    UnknownLevel(usize),
}

impl EngineError {
    /// Stable machine-readable code (used by the agent protocol).
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidSwap { .. } => "invalid_swap",
            EngineError::Generation { .. } | EngineError::EmptyPalette => "generation_failed",
            EngineError::InvariantViolation(_) => "invariant_violation",
            EngineError::NotPlayable => "not_playable",
            EngineError::UnknownLevel(_) => "unknown_level",
        }
    }

    /// Whether the caller can simply carry on with the previous state.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::InvalidSwap { .. } | EngineError::NotPlayable)
    }
}
