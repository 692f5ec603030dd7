//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for terminal play. It renders into
//! a plain framebuffer that is diffed and flushed to the terminal backend,
//! without any widget/layout framework.
//!
//! - [`board_view`]: snapshot + cursor/selection/hint → framebuffer
//! - [`playback`]: settle trace → timed frames (swap, match, clear, refill)
//! - [`renderer`]: framebuffer → crossterm commands

pub mod board_view;
pub mod fb;
pub mod playback;
pub mod renderer;

pub use tui_match3_core as core;
pub use tui_match3_types as types;

pub use board_view::{AdapterStatusView, BoardLayout, BoardView, ViewState, Viewport};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use playback::{frames_for, Frame, FrameKind, Playback};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
