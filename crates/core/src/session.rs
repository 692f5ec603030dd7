//! Session module - the game session and its settle loop
//!
//! [`GameSession`] is an immutable value: every transition (`attempt_swap`,
//! `advance_level`, `restart`) returns a new session and leaves the old one
//! untouched. The color stream and token-id counter travel inside the session,
//! so a cloned session replays identically.
//!
//! # Settle cycle
//!
//! 1. the swap is validated (in bounds, adjacent) and the move is spent
//! 2. the two cells are exchanged and the board is scanned
//! 3. no match: the exchange is undone
//! 4. otherwise passes repeat (effects, clear, promote, score, gravity,
//!    refill, re-scan) until the board is quiet or the level target is met
//! 5. terminal check: target met → level complete; else no moves left →
//!    game over
//!
//! Every intermediate board lands in the returned [`SettleTrace`].

use tracing::{debug, instrument};

use crate::board::Board;
use crate::detect::detect;
use crate::effects::resolve_pass;
use crate::error::EngineError;
use crate::generator::generate_board;
use crate::gravity::apply_gravity;
use crate::rng::{ColorSource, SeededColors, TokenSource};
use crate::scoring::{meets_target, pass_score};
use crate::snapshot::GameSnapshot;
use crate::trace::{SettleOutcome, SettleStep, SettleTrace};
use crate::types::{Coord, GameStatus, LevelConfig, Swap};

/// Upper bound on resolve passes in one settle cycle.
///
/// Exceeding it is reported as an invariant violation rather than looping.
pub const MAX_SETTLE_PASSES: u32 = 256;

/// Result of an accepted swap: the next session and how it got there.
#[derive(Debug, Clone)]
pub struct SwapOutcome<C: ColorSource = SeededColors> {
    pub session: GameSession<C>,
    pub trace: SettleTrace,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameSession<C: ColorSource = SeededColors> {
    board: Board,
    score: u32,
    moves_remaining: u32,
    level_index: usize,
    level: LevelConfig,
    level_count: usize,
    is_over: bool,
    is_level_complete: bool,
    all_levels_cleared: bool,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    swaps: u32,
    tokens: TokenSource<C>,
}

impl GameSession<SeededColors> {
    /// Start at the first level with a seeded color stream.
    pub fn new(levels: &[LevelConfig], seed: u64) -> Result<Self, EngineError> {
        Self::with_source(levels, SeededColors::new(seed))
    }
}

impl<C: ColorSource> GameSession<C> {
    /// Start at the first level with any color source.
    pub fn with_source(levels: &[LevelConfig], colors: C) -> Result<Self, EngineError> {
        let level = levels.first().ok_or(EngineError::UnknownLevel(0))?;
        let mut tokens = TokenSource::new(colors);
        let board = generate_board(&mut tokens)?;
        Ok(Self::start(board, level.clone(), 0, levels.len(), tokens))
    }

    /// Resume from an existing board (test fixtures, agent scenarios).
    ///
    /// The board must be settled: no empty cells.
    pub fn from_board(
        board: Board,
        levels: &[LevelConfig],
        level_index: usize,
        colors: C,
    ) -> Result<Self, EngineError> {
        let level = levels
            .get(level_index)
            .ok_or(EngineError::UnknownLevel(level_index))?;
        if board.first_empty().is_some() {
            return Err(EngineError::InvariantViolation(
                "session board has empty cells",
            ));
        }
        let tokens = TokenSource::resume_after(colors, board.max_id());
        Ok(Self::start(
            board,
            level.clone(),
            level_index,
            levels.len(),
            tokens,
        ))
    }

    fn start(
        board: Board,
        level: LevelConfig,
        level_index: usize,
        level_count: usize,
        tokens: TokenSource<C>,
    ) -> Self {
        Self {
            board,
            score: 0,
            moves_remaining: level.move_budget,
            level_index,
            level,
            level_count,
            is_over: false,
            is_level_complete: false,
            all_levels_cleared: false,
            episode_id: 0,
            swaps: 0,
            tokens,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves_remaining(&self) -> u32 {
        self.moves_remaining
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    pub fn target_score(&self) -> u32 {
        self.level.target_score
    }

    pub fn is_over(&self) -> bool {
        self.is_over
    }

    pub fn is_level_complete(&self) -> bool {
        self.is_level_complete
    }

    pub fn all_levels_cleared(&self) -> bool {
        self.all_levels_cleared
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn seed(&self) -> u64 {
        self.tokens.seed()
    }

    pub fn status(&self) -> GameStatus {
        if self.is_over {
            GameStatus::GameOver
        } else if self.is_level_complete {
            GameStatus::LevelComplete
        } else {
            GameStatus::Playing
        }
    }

    pub fn is_playable(&self) -> bool {
        self.status() == GameStatus::Playing
    }

    /// Try to exchange two cells and settle the board.
    ///
    /// `Err(InvalidSwap)` means the swap was refused outright: nothing
    /// changed and no move was spent. A swap that matches nothing is still
    /// accepted (and spends a move); its trace reports `Reverted`.
    pub fn attempt_swap(&self, from: Coord, to: Coord) -> Result<SwapOutcome<C>, EngineError> {
        self.apply_swap(Swap::new(from, to))
    }

    #[instrument(level = "debug", skip(self), fields(level = self.level_index, score = self.score))]
    pub fn apply_swap(&self, swap: Swap) -> Result<SwapOutcome<C>, EngineError> {
        if !self.is_playable() {
            return Err(EngineError::NotPlayable);
        }
        if !swap.is_valid() {
            return Err(EngineError::InvalidSwap {
                from: swap.from,
                to: swap.to,
            });
        }

        let mut next = self.clone();
        next.moves_remaining = next.moves_remaining.saturating_sub(1);
        next.swaps = next.swaps.wrapping_add(1);
        next.board.swap_cells(swap.from, swap.to);
        let swapped = next.board.clone();

        let mut set = detect(&next.board)?;
        let mut steps = Vec::new();
        let outcome = if set.is_empty() {
            next.board.swap_cells(swap.from, swap.to);
            debug!("no match, swap reverted");
            SettleOutcome::Reverted
        } else {
            let mut pass = 0u32;
            loop {
                pass += 1;
                if pass > MAX_SETTLE_PASSES {
                    return Err(EngineError::InvariantViolation(
                        "cascade did not settle",
                    ));
                }

                let resolution = resolve_pass(&mut next.board, &set, &mut next.tokens);
                let score = pass_score(set.len(), resolution.promoted.is_some());
                next.score = next.score.saturating_add(score.total);
                let cleared_board = next.board.clone();
                let refilled = apply_gravity(&mut next.board, &mut next.tokens)?;

                debug!(
                    pass,
                    matched = set.len(),
                    cleared = resolution.cleared.len(),
                    triggered = resolution.triggered.len(),
                    promoted = resolution.promoted.is_some(),
                    points = score.total,
                    "resolve pass"
                );

                steps.push(SettleStep {
                    pass,
                    matched: set.as_slice().to_vec(),
                    triggered: resolution.triggered,
                    cleared: resolution.cleared,
                    promoted: resolution.promoted,
                    score,
                    cleared_board,
                    refilled,
                    board: next.board.clone(),
                });

                if meets_target(next.score, next.level.target_score) {
                    break;
                }
                set = detect(&next.board)?;
                if set.is_empty() {
                    break;
                }
            }
            SettleOutcome::Settled
        };

        if meets_target(next.score, next.level.target_score) {
            next.is_level_complete = true;
            debug!(score = next.score, "level complete");
        } else if next.moves_remaining == 0 {
            next.is_over = true;
            debug!(score = next.score, "out of moves");
        }

        let trace = SettleTrace {
            swap,
            before: self.board.clone(),
            swapped,
            steps,
            outcome,
            status: next.status(),
        };
        Ok(SwapOutcome {
            session: next,
            trace,
        })
    }

    /// Move on from a completed level.
    ///
    /// After the last level the session ends as game over with
    /// `all_levels_cleared` set.
    pub fn advance_level(&self, levels: &[LevelConfig]) -> Result<Self, EngineError> {
        if !self.is_level_complete || self.is_over {
            return Err(EngineError::NotPlayable);
        }

        let mut next = self.clone();
        let index = self.level_index + 1;
        let Some(level) = levels.get(index) else {
            next.is_level_complete = false;
            next.is_over = true;
            next.all_levels_cleared = true;
            debug!(levels = levels.len(), "all levels cleared");
            return Ok(next);
        };

        next.board = generate_board(&mut next.tokens)?;
        next.level = level.clone();
        next.level_index = index;
        next.level_count = levels.len();
        next.score = 0;
        next.moves_remaining = level.move_budget;
        next.is_level_complete = false;
        debug!(level = index, target = level.target_score, "level started");
        Ok(next)
    }

    /// Start over from the first level, continuing the color stream.
    pub fn restart(&self, levels: &[LevelConfig]) -> Result<Self, EngineError> {
        let level = levels.first().ok_or(EngineError::UnknownLevel(0))?;
        let mut tokens = self.tokens.clone();
        let board = generate_board(&mut tokens)?;
        let mut next = Self::start(board, level.clone(), 0, levels.len(), tokens);
        next.episode_id = self.episode_id.wrapping_add(1);
        Ok(next)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut snap = GameSnapshot::default();
        self.snapshot_into(&mut snap);
        snap
    }

    /// Fill a caller-owned snapshot (no allocation).
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_u8_grid(&mut out.cells);
        out.score = self.score;
        out.moves_remaining = self.moves_remaining;
        out.level = self.level_index as u32;
        out.level_count = self.level_count as u32;
        out.target_score = self.level.target_score;
        out.status = self.status();
        out.all_levels_cleared = self.all_levels_cleared;
        out.seed = self.seed();
        out.episode_id = self.episode_id;
        out.swaps = self.swaps;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Color, LEVELS};

    const QUIET: [&str; 8] = [
        "RYPGOBRY", "YPGOBRYP", "PGOBRYPG", "GOBRYPGO", "OBRYPGOB", "BRYPGOBR", "RYPGOBRY",
        "YPGOBRYP",
    ];

    /// Cycles through a fixed list of colors.
    #[derive(Debug, Clone)]
    struct Cycle(Vec<Color>, usize);

    impl ColorSource for Cycle {
        fn next_color(&mut self) -> Color {
            let c = self.0[self.1 % self.0.len()];
            self.1 += 1;
            c
        }
    }

    fn levels(target: u32, moves: u32) -> Vec<LevelConfig> {
        vec![
            LevelConfig::new(target, moves, "first"),
            LevelConfig::new(target * 2, moves, "second"),
        ]
    }

    fn session(rows: [&str; 8], target: u32, moves: u32) -> GameSession<Cycle> {
        let board = Board::parse(&rows).unwrap();
        // Cycling the full palette row-major never lines up three.
        let colors = Cycle(Color::ALL.to_vec(), 0);
        GameSession::from_board(board, &levels(target, moves), 0, colors).unwrap()
    }

    #[test]
    fn test_new_session_starts_clean() {
        let s = GameSession::new(&LEVELS, 99).unwrap();
        assert_eq!(s.score(), 0);
        assert_eq!(s.moves_remaining(), 30);
        assert_eq!(s.level_index(), 0);
        assert_eq!(s.status(), GameStatus::Playing);
        assert!(!s.board().has_run());
        assert_eq!(s.seed(), 99);
    }

    #[test]
    fn test_empty_level_table_is_rejected() {
        assert_eq!(
            GameSession::new(&[], 1).unwrap_err(),
            EngineError::UnknownLevel(0)
        );
    }

    #[test]
    fn test_invalid_swap_changes_nothing() {
        let s = session(QUIET, 1000, 5);
        let err = s
            .attempt_swap(Coord::new(0, 0), Coord::new(1, 1))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSwap { .. }));
        let err = s
            .attempt_swap(Coord::new(7, 7), Coord::new(7, 8))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSwap { .. }));
        assert_eq!(s.moves_remaining(), 5);
    }

    #[test]
    fn test_swap_without_match_reverts_and_spends_move() {
        let s = session(QUIET, 1000, 5);
        let out = s.attempt_swap(Coord::new(0, 0), Coord::new(0, 1)).unwrap();
        assert!(out.trace.reverted());
        assert!(out.trace.steps.is_empty());
        assert_eq!(out.session.board(), s.board());
        assert_eq!(out.session.moves_remaining(), 4);
        assert_eq!(out.session.score(), 0);
        // The original session is untouched.
        assert_eq!(s.moves_remaining(), 5);
    }

    #[test]
    fn test_last_move_without_match_is_game_over() {
        let s = session(QUIET, 1000, 1);
        let out = s.attempt_swap(Coord::new(0, 0), Coord::new(0, 1)).unwrap();
        assert_eq!(out.session.status(), GameStatus::GameOver);
        assert_eq!(out.trace.status, GameStatus::GameOver);
        assert_eq!(
            out.session
                .attempt_swap(Coord::new(1, 0), Coord::new(1, 1))
                .unwrap_err(),
            EngineError::NotPlayable
        );
    }

    #[test]
    fn test_reaching_target_completes_level() {
        let mut rows = QUIET;
        // Swapping (0,2) and (0,3) lines up red at row 0, cols 0..=2.
        rows[0] = "RRYRGOBR";
        let s = session(rows, 30, 5);
        let out = s.attempt_swap(Coord::new(0, 2), Coord::new(0, 3)).unwrap();
        assert!(!out.trace.reverted());
        assert_eq!(out.session.status(), GameStatus::LevelComplete);
        assert_eq!(out.trace.steps.len(), 1);
        assert!(out.session.score() >= 30);
    }

    #[test]
    fn test_not_playable_after_level_complete() {
        let mut rows = QUIET;
        rows[0] = "RRYRGOBR";
        let s = session(rows, 30, 5)
            .attempt_swap(Coord::new(0, 2), Coord::new(0, 3))
            .unwrap()
            .session;
        assert_eq!(
            s.attempt_swap(Coord::new(5, 5), Coord::new(5, 6)).unwrap_err(),
            EngineError::NotPlayable
        );
    }

    #[test]
    fn test_advance_level_resets_score_and_budget() {
        let mut rows = QUIET;
        rows[0] = "RRYRGOBR";
        let lv = levels(30, 5);
        let done = session(rows, 30, 5)
            .attempt_swap(Coord::new(0, 2), Coord::new(0, 3))
            .unwrap()
            .session;

        let next = done.advance_level(&lv).unwrap();
        assert_eq!(next.level_index(), 1);
        assert_eq!(next.score(), 0);
        assert_eq!(next.target_score(), 60);
        assert_eq!(next.moves_remaining(), 5);
        assert_eq!(next.status(), GameStatus::Playing);
        assert_eq!(next.board().empty_count(), 0);
    }

    #[test]
    fn test_advance_past_last_level_ends_game() {
        let mut rows = QUIET;
        rows[0] = "RRYRGOBR";
        let lv = vec![LevelConfig::new(30, 5, "only")];
        let board = Board::parse(&rows).unwrap();
        let done = GameSession::from_board(board, &lv, 0, Cycle(Color::ALL.to_vec(), 0))
            .unwrap()
            .attempt_swap(Coord::new(0, 2), Coord::new(0, 3))
            .unwrap()
            .session;

        let end = done.advance_level(&lv).unwrap();
        assert_eq!(end.status(), GameStatus::GameOver);
        assert!(end.all_levels_cleared());
    }

    #[test]
    fn test_advance_requires_completed_level() {
        let s = session(QUIET, 1000, 5);
        assert_eq!(
            s.advance_level(&levels(1000, 5)).unwrap_err(),
            EngineError::NotPlayable
        );
    }

    #[test]
    fn test_restart_returns_to_first_level() {
        let s = GameSession::new(&LEVELS, 5).unwrap();
        let out = s.attempt_swap(Coord::new(0, 0), Coord::new(0, 1)).unwrap();
        let again = out.session.restart(&LEVELS).unwrap();
        assert_eq!(again.level_index(), 0);
        assert_eq!(again.score(), 0);
        assert_eq!(again.moves_remaining(), 30);
        assert_eq!(again.episode_id(), 1);
        assert!(!again.board().has_run());
    }

    #[test]
    fn test_snapshot_reflects_session() {
        let s = session(QUIET, 1000, 5);
        let snap = s.snapshot();
        assert_eq!(snap.cells[0][0], Color::Red.code());
        assert_eq!(snap.moves_remaining, 5);
        assert_eq!(snap.target_score, 1000);
        assert_eq!(snap.level_count, 2);
        assert!(snap.playable());
    }
}
