//! Terminal input module (engine-facing).
//!
//! This crate is independent of any UI framework beyond `crossterm` events.
//! It maps keys into [`KeyInput`]s, tracks the board cursor and selection,
//! and turns pointer drags into swaps. It never touches game rules: its only
//! output towards the engine is a [`Swap`](crate::types::Swap) request.

pub mod cursor;
pub mod gesture;
pub mod map;

pub use tui_match3_types as types;

pub use cursor::Cursor;
pub use gesture::{swipe_target, GestureConfig, GestureTracker};
pub use map::{handle_key_event, should_quit, KeyInput};
