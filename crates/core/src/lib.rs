//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the match-three rules engine: board generation, match
//! detection, special effects, gravity, scoring and the session lifecycle.
//! It has **no dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed (or color source) produces identical games
//! - **Testable**: Every rule is a plain function over a [`Board`]
//! - **Portable**: Runs in a terminal, headless simulator, or behind the agent adapter
//!
//! # Module Structure
//!
//! - [`board`]: 8x8 token grid
//! - [`generator`]: initial boards free of matches
//! - [`detect`]: horizontal, vertical, L and T match scanning
//! - [`effects`]: special-token effects, clearing and promotion
//! - [`gravity`]: column compaction and refill
//! - [`scoring`]: per-pass points
//! - [`session`]: immutable game session and the settle loop
//! - [`trace`]: intermediate boards of a settle cycle
//! - [`rng`]: seeded color stream and token identities
//!
//! # Game Rules
//!
//! - A swap must exchange two orthogonally adjacent cells; it always costs a move
//! - Three or more equal colors in a row or column match and clear
//! - Matches of 4, 5 and 6+ cells leave behind a row/column, area, or color clearer
//! - Cleared cells fall and refill from the top; cascades repeat until quiet
//! - Reaching the target score completes the level; running out of moves ends the game
//!
//! # Example
//!
//! ```
//! use tui_match3_core::GameSession;
//! use tui_match3_core::types::{Coord, GameStatus, LEVELS};
//!
//! let session = GameSession::new(&LEVELS, 12345).unwrap();
//! assert_eq!(session.status(), GameStatus::Playing);
//!
//! // A non-adjacent swap is refused without spending a move.
//! assert!(session.attempt_swap(Coord::new(0, 0), Coord::new(2, 2)).is_err());
//!
//! // An adjacent swap is always accepted; it either settles or reverts.
//! let outcome = session.attempt_swap(Coord::new(0, 0), Coord::new(0, 1)).unwrap();
//! assert_eq!(outcome.session.moves_remaining(), 29);
//! ```

pub mod board;
pub mod detect;
pub mod effects;
pub mod error;
pub mod generator;
pub mod gravity;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod snapshot;
pub mod trace;

pub use tui_match3_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use detect::{detect, MatchSet};
pub use effects::{Promotion, TriggeredEffect};
pub use error::EngineError;
pub use generator::{generate, generate_board, MAX_GENERATION_PASSES};
pub use rng::{ColorSource, SeededColors, TokenSource};
pub use scoring::{pass_score, PassScore};
pub use session::{GameSession, SwapOutcome, MAX_SETTLE_PASSES};
pub use snapshot::GameSnapshot;
pub use trace::{SettleOutcome, SettleStep, SettleTrace};
