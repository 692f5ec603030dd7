//! TUI Match-3 (workspace facade crate).
//!
//! Re-exports `tui_match3::{core,adapter,term,input,engine,types}` so the
//! binaries, integration tests and benches share one import root while the
//! implementation lives in dedicated crates under `crates/`.

pub use tui_match3_adapter as adapter;
pub use tui_match3_core as core;
pub use tui_match3_engine as engine;
pub use tui_match3_input as input;
pub use tui_match3_term as term;
pub use tui_match3_types as types;

pub mod logging;
