//! Pointer drag translation.
//!
//! A drag starts on a cell and ends anywhere. If neither axis moved by more
//! than the threshold, nothing happens. Otherwise the dominant axis picks the
//! neighbour (ties go vertical) and the drag becomes a swap with it, unless
//! that neighbour is off the board.
//!
//! Distances are in whatever unit the front-end reports; the terminal scales
//! character cells up so the default threshold feels like a short drag.

use crate::types::{Coord, Direction, Swap};

/// Default drag threshold, in pointer units.
pub const DEFAULT_THRESHOLD: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureConfig {
    pub threshold: i32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Swap for a drag from `from` by `(dx, dy)`; `dy` grows downward.
pub fn swipe_target(from: Coord, dx: i32, dy: i32, threshold: i32) -> Option<Swap> {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ax <= threshold && ay <= threshold {
        return None;
    }
    let dir = if ax > ay {
        if dx > 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy > 0 {
        Direction::Down
    } else {
        Direction::Up
    };
    let to = from.neighbor(dir)?;
    Some(Swap::new(from, to))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Press {
    cell: Coord,
    x: i32,
    y: i32,
}

/// Tracks one press/release pair.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    config: GestureConfig,
    press: Option<Press>,
}

impl GestureTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            press: None,
        }
    }

    pub fn config(&self) -> GestureConfig {
        self.config
    }

    /// Start a drag on `cell`; presses outside the board are ignored.
    pub fn press(&mut self, cell: Coord, x: i32, y: i32) {
        self.press = cell.in_bounds().then_some(Press { cell, x, y });
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    /// Finish the drag; returns the requested swap, if any.
    pub fn release(&mut self, x: i32, y: i32) -> Option<Swap> {
        let p = self.press.take()?;
        swipe_target(p.cell, x - p.x, y - p.y, self.config.threshold)
    }

    pub fn cancel(&mut self) {
        self.press = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: Coord = Coord::new(3, 3);

    #[test]
    fn test_small_drag_is_ignored() {
        assert_eq!(swipe_target(C, 30, -30, 30), None);
        assert_eq!(swipe_target(C, 0, 0, 30), None);
    }

    #[test]
    fn test_dominant_axis_wins() {
        assert_eq!(
            swipe_target(C, 40, 10, 30),
            Some(Swap::new(C, Coord::new(3, 4)))
        );
        assert_eq!(
            swipe_target(C, -40, 35, 30),
            Some(Swap::new(C, Coord::new(3, 2)))
        );
        assert_eq!(
            swipe_target(C, 5, -31, 30),
            Some(Swap::new(C, Coord::new(2, 3)))
        );
        // Equal magnitudes resolve vertically.
        assert_eq!(
            swipe_target(C, 50, 50, 30),
            Some(Swap::new(C, Coord::new(4, 3)))
        );
    }

    #[test]
    fn test_off_board_target_is_dropped() {
        assert_eq!(swipe_target(Coord::new(0, 0), 0, -100, 30), None);
        assert_eq!(swipe_target(Coord::new(7, 7), 100, 0, 30), None);
    }

    #[test]
    fn test_tracker_press_release() {
        let mut t = GestureTracker::new(GestureConfig { threshold: 10 });
        assert_eq!(t.release(100, 100), None);

        t.press(C, 100, 100);
        assert!(t.is_pressed());
        assert_eq!(t.release(100, 115), Some(Swap::new(C, Coord::new(4, 3))));
        assert!(!t.is_pressed());

        t.press(Coord::new(8, 0), 0, 0);
        assert!(!t.is_pressed());
    }
}
