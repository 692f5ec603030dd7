//! RNG module - token colors and identities
//!
//! Colors for new tokens come from a [`ColorSource`]. The default source,
//! [`SeededColors`], draws uniformly from a palette with a seeded `StdRng`,
//! so the same seed always produces the same game. Tests can plug in any
//! other source (a fixed script, a single color, ...).
//!
//! [`TokenSource`] pairs a color source with the token-id counter: every
//! token it hands out carries a fresh [`TokenId`].

use arrayvec::ArrayVec;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::EngineError;
use crate::types::{Color, SpecialKind, Token, TokenId};

/// Supplies colors for generated and refilled tokens.
///
/// Implementations must be cheap to clone: sessions are immutable values and
/// every transition clones the source along with the board.
pub trait ColorSource: Clone {
    fn next_color(&mut self) -> Color;

    /// Seed of the underlying stream, if any (reported in snapshots).
    fn seed(&self) -> u64 {
        0
    }
}

/// Uniform palette draws from a seeded `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededColors {
    rng: StdRng,
    palette: ArrayVec<Color, 6>,
    seed: u64,
}

impl SeededColors {
    /// Full six-color palette.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            palette: ArrayVec::from(Color::ALL),
            seed,
        }
    }

    /// Restricted palette (duplicates are dropped, order kept).
    pub fn with_palette(seed: u64, palette: &[Color]) -> Result<Self, EngineError> {
        let mut colors = ArrayVec::<Color, 6>::new();
        for &c in palette {
            if !colors.contains(&c) {
                colors.push(c);
            }
        }
        if colors.is_empty() {
            return Err(EngineError::EmptyPalette);
        }
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            palette: colors,
            seed,
        })
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }
}

impl ColorSource for SeededColors {
    fn next_color(&mut self) -> Color {
        let i = self.rng.random_range(0..self.palette.len());
        self.palette[i]
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

/// Hands out tokens with fresh identities.
#[derive(Debug, Clone)]
pub struct TokenSource<C: ColorSource> {
    colors: C,
    next_id: u32,
}

impl<C: ColorSource> TokenSource<C> {
    pub fn new(colors: C) -> Self {
        Self { colors, next_id: 1 }
    }

    /// Continue numbering after an existing id (e.g. a board built elsewhere).
    pub fn resume_after(colors: C, last: TokenId) -> Self {
        Self {
            colors,
            next_id: last.0.wrapping_add(1).max(1),
        }
    }

    fn next_id(&mut self) -> TokenId {
        let id = TokenId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Plain token of a random color.
    pub fn fresh(&mut self) -> Token {
        let color = self.colors.next_color();
        let id = self.next_id();
        Token::new(color, id)
    }

    pub fn promoted(&mut self, color: Color, special: SpecialKind) -> Token {
        let id = self.next_id();
        Token::special(color, special, id)
    }

    pub fn empty(&mut self) -> Token {
        let id = self.next_id();
        Token::empty(id)
    }

    pub fn seed(&self) -> u64 {
        self.colors.seed()
    }

    pub fn colors(&self) -> &C {
        &self.colors
    }
}
