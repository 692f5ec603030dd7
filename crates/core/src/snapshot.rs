use crate::types::{GameStatus, GRID_SIZE};

/// Flat, copyable view of a session for renderers and the agent adapter.
///
/// `cells` holds [`Token::code`](crate::types::Token::code) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub cells: [[u8; GRID_SIZE as usize]; GRID_SIZE as usize],
    pub score: u32,
    pub moves_remaining: u32,
    /// 0-based index into the level table
    pub level: u32,
    pub level_count: u32,
    pub target_score: u32,
    pub status: GameStatus,
    /// Set once the final level has been completed and advanced past
    pub all_levels_cleared: bool,
    pub seed: u64,
    /// Increments on every restart
    pub episode_id: u32,
    /// Accepted swaps since the session started (including reverted ones)
    pub swaps: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn playable(&self) -> bool {
        self.status == GameStatus::Playing
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            cells: [[0u8; GRID_SIZE as usize]; GRID_SIZE as usize],
            score: 0,
            moves_remaining: 0,
            level: 0,
            level_count: 0,
            target_score: 0,
            status: GameStatus::Playing,
            all_levels_cleared: false,
            seed: 0,
            episode_id: 0,
            swaps: 0,
        }
    }
}
