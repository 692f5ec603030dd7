//! BoardView: maps a [`GameSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameSnapshot;
use crate::fb::{Cell, CellStyle, FrameBuffer, Rgb};
use crate::playback::{Frame, FrameKind};
use crate::types::{Color, Coord, GameStatus, SpecialKind, Swap, GRID_SIZE};

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub enabled: bool,
    pub client_count: u16,
    pub controller_id: Option<usize>,
}

/// Where the board frame sits on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    pub x: u16,
    pub y: u16,
    pub frame_w: u16,
    pub frame_h: u16,
}

/// Transient UI state layered over the snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewState<'a> {
    pub cursor: Option<Coord>,
    pub selected: Option<Coord>,
    pub hint: Option<Swap>,
    /// Playback frame replacing the snapshot's cells while animating
    pub frame: Option<&'a Frame>,
    pub adapter: Option<&'a AdapterStatusView>,
}

/// Terminal renderer for the match-three board.
pub struct BoardView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for BoardView {
    fn default() -> Self {
        // 4x2 keeps cells roughly square and easy to hit with the mouse.
        Self {
            cell_w: 4,
            cell_h: 2,
        }
    }
}

impl BoardView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    pub fn cell_size(&self) -> (u16, u16) {
        (self.cell_w, self.cell_h)
    }

    pub fn layout(&self, viewport: Viewport) -> BoardLayout {
        let frame_w = GRID_SIZE as u16 * self.cell_w + 2;
        let frame_h = GRID_SIZE as u16 * self.cell_h + 2;
        // Leave room on the right for the side panel.
        let total_w = frame_w + 24;
        BoardLayout {
            x: viewport.width.saturating_sub(total_w) / 2,
            y: viewport.height.saturating_sub(frame_h) / 2,
            frame_w,
            frame_h,
        }
    }

    /// Board cell under a terminal position, if any.
    pub fn cell_at(&self, viewport: Viewport, x: u16, y: u16) -> Option<Coord> {
        let l = self.layout(viewport);
        let bx = x.checked_sub(l.x + 1)?;
        let by = y.checked_sub(l.y + 1)?;
        let at = Coord::new((by / self.cell_h) as u8, (bx / self.cell_w) as u8);
        let inside = bx / self.cell_w < GRID_SIZE as u16 && by / self.cell_h < GRID_SIZE as u16;
        inside.then_some(at)
    }

    /// Render into an existing framebuffer (no allocation after the first frame).
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        ui: &ViewState<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Cell::default());

        let l = self.layout(viewport);
        let border = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);
        fb.fill_rect(
            l.x + 1,
            l.y + 1,
            l.frame_w - 2,
            l.frame_h - 2,
            ' ',
            CellStyle::new(BOARD_BG, BOARD_BG),
        );
        fb.draw_box(l.x, l.y, l.frame_w, l.frame_h, border);

        let cells = ui.frame.map(|f| &f.cells).unwrap_or(&snap.cells);
        for r in 0..GRID_SIZE {
            for c in 0..GRID_SIZE {
                let at = Coord::new(r, c);
                let code = cells[r as usize][c as usize];
                self.draw_cell(fb, l, at, code, self.cell_tint(at, ui));
            }
        }

        self.draw_side_panel(fb, snap, ui.adapter, viewport, l);

        match snap.status {
            GameStatus::Playing => {}
            GameStatus::LevelComplete => {
                self.draw_overlay(fb, l, "LEVEL COMPLETE", "n: next level");
            }
            GameStatus::GameOver if snap.all_levels_cleared => {
                self.draw_overlay(fb, l, "ALL LEVELS CLEARED", "r: play again");
            }
            GameStatus::GameOver => {
                self.draw_overlay(fb, l, "GAME OVER", "r: restart");
            }
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, ui: &ViewState<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, ui, viewport, &mut fb);
        fb
    }

    fn cell_tint(&self, at: Coord, ui: &ViewState<'_>) -> Tint {
        if let Some(frame) = ui.frame {
            if frame.is_marked(at) {
                return match frame.kind {
                    FrameKind::Swapping => Tint::Swapping,
                    FrameKind::Matching => Tint::Matching,
                    FrameKind::Cleared | FrameKind::Refilled => Tint::Fresh,
                };
            }
            return Tint::None;
        }
        if ui.selected == Some(at) {
            Tint::Selected
        } else if ui.cursor == Some(at) {
            Tint::Cursor
        } else if ui.hint.is_some_and(|h| h.from == at || h.to == at) {
            Tint::Hint
        } else {
            Tint::None
        }
    }

    fn draw_cell(&self, fb: &mut FrameBuffer, l: BoardLayout, at: Coord, code: u8, tint: Tint) {
        let px = l.x + 1 + at.col as u16 * self.cell_w;
        let py = l.y + 1 + at.row as u16 * self.cell_h;

        let bg = match tint {
            Tint::None => BOARD_BG,
            Tint::Cursor => Rgb::new(70, 70, 90),
            Tint::Selected => Rgb::new(120, 120, 150),
            Tint::Hint => Rgb::new(60, 90, 60),
            Tint::Swapping => Rgb::new(90, 90, 120),
            Tint::Matching => Rgb::new(230, 230, 230),
            Tint::Fresh => Rgb::new(50, 50, 70),
        };
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ' ', CellStyle::new(BOARD_BG, bg));

        let Some((color, special)) = decode_cell(code) else {
            let style = CellStyle::new(Rgb::new(90, 90, 100), bg).dim();
            fb.put_char(px + self.cell_w / 2, py + (self.cell_h - 1) / 2, '·', style);
            return;
        };
        let mut style = CellStyle::new(color_rgb(color), bg).bold();
        if tint == Tint::Matching {
            style.fg = color_rgb(color).lighten();
        }
        let glyph = special_glyph(special);
        let gx = px + self.cell_w.saturating_sub(1) / 2;
        fb.put_char(gx, py + (self.cell_h - 1) / 2, glyph, style);
        if self.cell_w >= 3 && special.is_special() {
            fb.put_char(gx + 1, py + (self.cell_h - 1) / 2, glyph, style);
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        l: BoardLayout,
    ) {
        let panel_x = l.x.saturating_add(l.frame_w).saturating_add(2);
        if panel_x.saturating_add(12) > viewport.width {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), PANEL_BG).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);
        let dim = value.dim();

        let mut y = l.y;
        fb.put_str(panel_x, y, "LEVEL", label);
        y += 1;
        let w = fb.put_u32(panel_x, y, snap.level + 1, value);
        fb.put_char(panel_x + w, y, '/', dim);
        fb.put_u32(panel_x + w + 1, y, snap.level_count, dim);
        y += 2;

        fb.put_str(panel_x, y, "TARGET", label);
        y += 1;
        fb.put_u32(panel_x, y, snap.target_score, value);
        y += 2;

        fb.put_str(panel_x, y, "SCORE", label);
        y += 1;
        let score_style = if snap.score >= snap.target_score {
            CellStyle::new(Rgb::new(120, 230, 120), PANEL_BG).bold()
        } else {
            value
        };
        fb.put_u32(panel_x, y, snap.score, score_style);
        y += 2;

        fb.put_str(panel_x, y, "MOVES", label);
        y += 1;
        let moves_style = if snap.moves_remaining <= 3 {
            CellStyle::new(Rgb::new(230, 100, 100), PANEL_BG).bold()
        } else {
            value
        };
        fb.put_u32(panel_x, y, snap.moves_remaining, moves_style);
        y += 2;

        fb.put_str(panel_x, y, "AI", label);
        y += 1;
        match adapter {
            Some(st) if st.enabled => {
                fb.put_str(panel_x, y, "ON", value);
                y += 1;
                fb.put_str(panel_x, y, "C", value);
                fb.put_u32(panel_x + 2, y, st.client_count as u32, value);
                y += 1;
                fb.put_str(panel_x, y, "CTRL", value);
                match st.controller_id {
                    Some(id) => fb.put_u32(panel_x + 5, y, id as u32, value),
                    None => fb.put_str(panel_x + 5, y, "-", value),
                };
            }
            _ => {
                fb.put_str(panel_x, y, "OFF", value);
            }
        }
        y += 2;

        if y < viewport.height {
            fb.put_str(panel_x, y, "? hint  r restart", dim);
            fb.put_str(panel_x, y + 1, "q quit", dim);
        }
    }

    fn draw_overlay(&self, fb: &mut FrameBuffer, l: BoardLayout, title: &str, help: &str) {
        let mid_y = l.y.saturating_add(l.frame_h / 2);
        let title_style = CellStyle::new(Rgb::new(255, 255, 255), PANEL_BG).bold();
        let help_style = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);
        fb.put_str_centered(l.x, l.frame_w, mid_y.saturating_sub(1), title, title_style);
        fb.put_str_centered(l.x, l.frame_w, mid_y, help, help_style);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tint {
    None,
    Cursor,
    Selected,
    Hint,
    Swapping,
    Matching,
    Fresh,
}

/// Split a snapshot cell code into color and special kind.
pub fn decode_cell(code: u8) -> Option<(Color, SpecialKind)> {
    let color = Color::from_code(code % 8)?;
    let special = match code / 8 {
        0 => SpecialKind::None,
        1 => SpecialKind::RowClear,
        2 => SpecialKind::ColumnClear,
        3 => SpecialKind::AreaClear,
        4 => SpecialKind::ColorClear,
        _ => return None,
    };
    Some((color, special))
}

fn color_rgb(color: Color) -> Rgb {
    match color {
        Color::Red => Rgb::new(230, 70, 70),
        Color::Yellow => Rgb::new(240, 220, 80),
        Color::Purple => Rgb::new(190, 110, 230),
        Color::Green => Rgb::new(100, 220, 120),
        Color::Orange => Rgb::new(255, 160, 40),
        Color::Blue => Rgb::new(80, 140, 240),
    }
}

pub fn special_glyph(kind: SpecialKind) -> char {
    match kind {
        SpecialKind::None => '●',
        SpecialKind::RowClear => '═',
        SpecialKind::ColumnClear => '║',
        SpecialKind::AreaClear => '▣',
        SpecialKind::ColorClear => '✦',
    }
}
