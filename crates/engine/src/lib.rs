//! Engine module - move search over a settled board
//!
//! Used for hints in the terminal game, by the headless simulator, and by
//! agents through the adapter.

pub mod moves;

pub use tui_match3_core as core;
pub use tui_match3_types as types;

pub use moves::{best_move, find_moves, has_moves, score_move, ScoredMove};
