//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, agent protocol).
//!
//! # Board Dimensions
//!
//! The playfield is a fixed square grid:
//!
//! - **Size**: 8x8 cells
//! - **Coordinates**: `(row, col)`, rows indexed top-to-bottom, columns left-to-right
//! - **Storage**: row-major (`row * GRID_SIZE + col`)
//!
//! # Scoring Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `POINTS_PER_CELL` | 10 | Points per matched cell in a resolve pass |
//! | `PROMOTION_BONUS` | 50 | Bonus when a pass promotes a special token |
//! | `MIN_RUN` | 3 | Shortest run that counts as a match |
//!
//! # Presentation Timing
//!
//! Timing values are in milliseconds and only consumed by presentation layers:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `SWAP_ANIM_MS` | 300 | Swap (and swap-back) reveal |
//! | `MATCH_ANIM_MS` | 300 | Matched cells highlight |
//! | `CASCADE_ANIM_MS` | 500 | Pause between cascade passes |
//!
//! # Examples
//!
//! ```
//! use tui_match3_types::{Color, Coord, Direction, GRID_SIZE};
//!
//! let c = Coord::new(3, 3);
//! assert_eq!(c.neighbor(Direction::Right), Some(Coord::new(3, 4)));
//! assert!(c.is_adjacent(Coord::new(4, 3)));
//! assert!(!c.is_adjacent(Coord::new(4, 4)));
//!
//! assert_eq!(Color::from_str("RED"), Some(Color::Red));
//! assert_eq!(GRID_SIZE, 8);
//! ```

use std::borrow::Cow;

/// Board side length in cells (8x8)
pub const GRID_SIZE: u8 = 8;

/// Total number of cells on the board
pub const CELL_COUNT: usize = (GRID_SIZE as usize) * (GRID_SIZE as usize);

/// Shortest run of identical colors that counts as a match
pub const MIN_RUN: usize = 3;

/// Points awarded per matched cell in a single resolve pass
pub const POINTS_PER_CELL: u32 = 10;

/// Bonus awarded when a resolve pass promotes a special token
pub const PROMOTION_BONUS: u32 = 50;

/// Swap reveal duration (and swap-back on a failed swap)
pub const SWAP_ANIM_MS: u32 = 300;

/// Matched-cells highlight duration before clearing
pub const MATCH_ANIM_MS: u32 = 300;

/// Pause between cascade passes
pub const CASCADE_ANIM_MS: u32 = 500;

/// Token colors
///
/// The palette is fixed; a cleared cell carries no color at all
/// (see [`Token::color`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Red,
    Yellow,
    Purple,
    Green,
    Orange,
    Blue,
}

impl Color {
    /// Full palette in a stable order
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Yellow,
        Color::Purple,
        Color::Green,
        Color::Orange,
        Color::Blue,
    ];

    /// Parse color from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_match3_types::Color;
    ///
    /// assert_eq!(Color::from_str("purple"), Some(Color::Purple));
    /// assert_eq!(Color::from_str("teal"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(Color::Red),
            "yellow" => Some(Color::Yellow),
            "purple" => Some(Color::Purple),
            "green" => Some(Color::Green),
            "orange" => Some(Color::Orange),
            "blue" => Some(Color::Blue),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Purple => "purple",
            Color::Green => "green",
            Color::Orange => "orange",
            Color::Blue => "blue",
        }
    }

    /// Compact cell code (1-6); 0 is reserved for an empty cell
    pub fn code(&self) -> u8 {
        match self {
            Color::Red => 1,
            Color::Yellow => 2,
            Color::Purple => 3,
            Color::Green => 4,
            Color::Orange => 5,
            Color::Blue => 6,
        }
    }

    /// Inverse of [`Color::code`]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Color::Red),
            2 => Some(Color::Yellow),
            3 => Some(Color::Purple),
            4 => Some(Color::Green),
            5 => Some(Color::Orange),
            6 => Some(Color::Blue),
            _ => None,
        }
    }
}

/// Special token variants
///
/// A special token fires its area effect when it is part of a match:
/// - **RowClear**: empties its whole row
/// - **ColumnClear**: empties its whole column
/// - **AreaClear**: empties the 3x3 neighbourhood (clamped to the board)
/// - **ColorClear**: empties every cell of its color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpecialKind {
    #[default]
    None,
    RowClear,
    ColumnClear,
    AreaClear,
    ColorClear,
}

impl SpecialKind {
    pub fn is_special(&self) -> bool {
        !matches!(self, SpecialKind::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialKind::None => "none",
            SpecialKind::RowClear => "row_clear",
            SpecialKind::ColumnClear => "column_clear",
            SpecialKind::AreaClear => "area_clear",
            SpecialKind::ColorClear => "color_clear",
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            SpecialKind::None => 0,
            SpecialKind::RowClear => 1,
            SpecialKind::ColumnClear => 2,
            SpecialKind::AreaClear => 3,
            SpecialKind::ColorClear => 4,
        }
    }
}

/// Opaque token identity.
///
/// Only meaningful to presentation layers tracking per-cell animation
/// continuity; resolution logic never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TokenId(pub u32);

/// One cell's content
///
/// - `color == None`: the empty sentinel (transient, between clear and refill)
/// - `color == Some(_)`: a settled token, possibly special
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub color: Option<Color>,
    pub special: SpecialKind,
    pub id: TokenId,
}

impl Token {
    pub fn new(color: Color, id: TokenId) -> Self {
        Self {
            color: Some(color),
            special: SpecialKind::None,
            id,
        }
    }

    pub fn special(color: Color, special: SpecialKind, id: TokenId) -> Self {
        Self {
            color: Some(color),
            special,
            id,
        }
    }

    pub fn empty(id: TokenId) -> Self {
        Self {
            color: None,
            special: SpecialKind::None,
            id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_none()
    }

    /// Same color and special kind; identity is ignored.
    pub fn same_content(&self, other: &Token) -> bool {
        self.color == other.color && self.special == other.special
    }

    /// Compact code for snapshots: `special * 8 + color`, 0 when empty.
    pub fn code(&self) -> u8 {
        match self.color {
            Some(color) => self.special.code() * 8 + color.code(),
            None => 0,
        }
    }
}

/// Cardinal direction on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// `(d_row, d_col)` step
    pub fn delta(&self) -> (i8, i8) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Board coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Build from signed components; `None` when outside the grid.
    pub fn checked(row: i16, col: i16) -> Option<Self> {
        let size = GRID_SIZE as i16;
        if row < 0 || col < 0 || row >= size || col >= size {
            return None;
        }
        Some(Self::new(row as u8, col as u8))
    }

    pub fn in_bounds(&self) -> bool {
        self.row < GRID_SIZE && self.col < GRID_SIZE
    }

    /// Flat row-major index; only valid for in-bounds coordinates
    #[inline(always)]
    pub fn index(&self) -> usize {
        (self.row as usize) * (GRID_SIZE as usize) + (self.col as usize)
    }

    pub fn from_index(index: usize) -> Self {
        let size = GRID_SIZE as usize;
        Self::new((index / size) as u8, (index % size) as u8)
    }

    /// Exactly one step apart horizontally or vertically
    pub fn is_adjacent(&self, other: Coord) -> bool {
        self.row.abs_diff(other.row) as u16 + self.col.abs_diff(other.col) as u16 == 1
    }

    pub fn neighbor(&self, dir: Direction) -> Option<Coord> {
        let (dr, dc) = dir.delta();
        Self::checked(self.row as i16 + dr as i16, self.col as i16 + dc as i16)
    }
}

/// A requested exchange of two cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swap {
    pub from: Coord,
    pub to: Coord,
}

impl Swap {
    pub const fn new(from: Coord, to: Coord) -> Self {
        Self { from, to }
    }

    /// Both cells in bounds and orthogonally adjacent
    pub fn is_valid(&self) -> bool {
        self.from.in_bounds() && self.to.in_bounds() && self.from.is_adjacent(self.to)
    }
}

/// Level configuration
///
/// Read-only input to the engine; levels advance in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelConfig {
    pub target_score: u32,
    pub move_budget: u32,
    pub label: Cow<'static, str>,
}

impl LevelConfig {
    pub fn new(target_score: u32, move_budget: u32, label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            target_score,
            move_budget,
            label: label.into(),
        }
    }
}

/// Built-in level table
pub const LEVELS: [LevelConfig; 5] = [
    LevelConfig {
        target_score: 1000,
        move_budget: 30,
        label: Cow::Borrowed("Level 1: Get 1000 points!"),
    },
    LevelConfig {
        target_score: 2500,
        move_budget: 25,
        label: Cow::Borrowed("Level 2: Get 2500 points!"),
    },
    LevelConfig {
        target_score: 5000,
        move_budget: 20,
        label: Cow::Borrowed("Level 3: Get 5000 points!"),
    },
    LevelConfig {
        target_score: 10000,
        move_budget: 15,
        label: Cow::Borrowed("Level 4: Get 10000 points!"),
    },
    LevelConfig {
        target_score: 20000,
        move_budget: 10,
        label: Cow::Borrowed("Level 5: Get 20000 points!"),
    },
];

/// Coarse session status, derived from the session flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Playing,
    LevelComplete,
    GameOver,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Playing => "playing",
            GameStatus::LevelComplete => "level_complete",
            GameStatus::GameOver => "game_over",
        }
    }
}

/// Game actions that can be applied to a session
///
/// These actions are used by both human input and agent control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Exchange two adjacent cells and settle the board
    Swap(Swap),
    /// Advance from a completed level
    NextLevel,
    /// Start over from the first level
    Restart,
    /// Ask for a suggested swap
    Hint,
}

impl GameAction {
    /// Parse a non-swap action from string (for the agent protocol)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_match3_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("next_level"), Some(GameAction::NextLevel));
    /// assert_eq!(GameAction::from_str("Restart"), Some(GameAction::Restart));
    /// assert_eq!(GameAction::from_str("swap"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "next_level" | "nextlevel" => Some(GameAction::NextLevel),
            "restart" => Some(GameAction::Restart),
            "hint" => Some(GameAction::Hint),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Swap(_) => "swap",
            GameAction::NextLevel => "next_level",
            GameAction::Restart => "restart",
            GameAction::Hint => "hint",
        }
    }
}
