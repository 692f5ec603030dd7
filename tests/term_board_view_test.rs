use tui_match3::core::{Board, GameSession, GameSnapshot, SeededColors};
use tui_match3::term::{
    encode_diff_into, encode_full_into, frames_for, AdapterStatusView, BoardView, FrameBuffer,
    FrameKind, ViewState, Viewport,
};
use tui_match3::types::{Coord, GameStatus, SpecialKind, Swap, LEVELS};

const QUIET: [&str; 8] = [
    "RYPGOBRY", "YPGOBRYP", "PGOBRYPG", "GOBRYPGO", "OBRYPGOB", "BRYPGOBR", "RYPGOBRY",
    "YPGOBRYP",
];

// 8x8 cells of 4x2 plus border is 34x18; 60x20 leaves room for the panel.
const VP: Viewport = Viewport {
    width: 60,
    height: 20,
};

fn session(rows: &[&str]) -> GameSession {
    let board = Board::parse(rows).unwrap();
    GameSession::from_board(board, &LEVELS, 0, SeededColors::new(1)).unwrap()
}

fn snap() -> GameSnapshot {
    session(&QUIET).snapshot()
}

fn row_text(fb: &FrameBuffer, y: u16) -> String {
    (0..fb.width()).map(|x| fb.get(x, y).unwrap().ch).collect()
}

/// Terminal position of a cell's glyph with the default 4x2 cells.
fn glyph_pos(at: Coord) -> (u16, u16) {
    (3 + at.col as u16 * 4, 2 + at.row as u16 * 2)
}

#[test]
fn board_view_draws_frame_corners() {
    let view = BoardView::default();
    let fb = view.render(&snap(), &ViewState::default(), VP);
    let l = view.layout(VP);
    assert_eq!((l.x, l.y, l.frame_w, l.frame_h), (1, 1, 34, 18));

    assert_eq!(fb.get(1, 1).unwrap().ch, '┌');
    assert_eq!(fb.get(34, 1).unwrap().ch, '┐');
    assert_eq!(fb.get(1, 18).unwrap().ch, '└');
    assert_eq!(fb.get(34, 18).unwrap().ch, '┘');
}

#[test]
fn board_view_draws_every_token() {
    let view = BoardView::default();
    let fb = view.render(&snap(), &ViewState::default(), VP);
    for r in 0..8 {
        for c in 0..8 {
            let (x, y) = glyph_pos(Coord::new(r, c));
            assert_eq!(fb.get(x, y).unwrap().ch, '●', "cell ({r},{c})");
        }
    }
}

#[test]
fn board_view_doubles_special_glyphs() {
    let mut s = snap();
    // Red color clear: special 4, color 1.
    s.cells[2][5] = 4 * 8 + 1;
    let fb = BoardView::default().render(&s, &ViewState::default(), VP);
    let (x, y) = glyph_pos(Coord::new(2, 5));
    assert_eq!(fb.get(x, y).unwrap().ch, '✦');
    assert_eq!(fb.get(x + 1, y).unwrap().ch, '✦');
    assert_eq!(
        tui_match3::term::board_view::special_glyph(SpecialKind::ColorClear),
        '✦'
    );
}

#[test]
fn board_view_maps_terminal_positions_to_cells() {
    let view = BoardView::default();
    assert_eq!(view.cell_at(VP, 2, 2), Some(Coord::new(0, 0)));
    assert_eq!(view.cell_at(VP, 5, 3), Some(Coord::new(0, 0)));
    assert_eq!(view.cell_at(VP, 6, 2), Some(Coord::new(0, 1)));
    assert_eq!(view.cell_at(VP, 33, 17), Some(Coord::new(7, 7)));
    // Border and beyond.
    assert_eq!(view.cell_at(VP, 1, 1), None);
    assert_eq!(view.cell_at(VP, 34, 2), None);
    assert_eq!(view.cell_at(VP, 3, 18), None);
}

#[test]
fn board_view_side_panel_shows_progress() {
    let mut s = snap();
    s.score = 1234;
    s.moves_remaining = 7;
    s.level = 1;
    s.level_count = 5;
    s.target_score = 2500;

    let fb = BoardView::default().render(&s, &ViewState::default(), VP);
    assert!(row_text(&fb, 1).contains("LEVEL"));
    assert!(row_text(&fb, 2).contains("2/5"));
    assert!(row_text(&fb, 5).contains("2500"));
    assert!(row_text(&fb, 8).contains("1234"));
    assert!(row_text(&fb, 11).contains('7'));
    assert!(row_text(&fb, 14).contains("OFF"));
}

#[test]
fn board_view_side_panel_shows_adapter_status() {
    let status = AdapterStatusView {
        enabled: true,
        client_count: 2,
        controller_id: Some(3),
    };
    let ui = ViewState {
        adapter: Some(&status),
        ..ViewState::default()
    };
    let fb = BoardView::default().render(&snap(), &ui, VP);
    assert!(row_text(&fb, 14).contains("ON"));
    assert!(row_text(&fb, 15).contains("C 2"));
    assert!(row_text(&fb, 16).contains("CTRL 3"));
}

#[test]
fn board_view_skips_side_panel_when_narrow() {
    let vp = Viewport::new(36, 20);
    let fb = BoardView::default().render(&snap(), &ViewState::default(), vp);
    for y in 0..20 {
        assert!(!row_text(&fb, y).contains("SCORE"));
    }
}

#[test]
fn board_view_overlays_follow_status() {
    let view = BoardView::default();
    let mut s = snap();

    let fb = view.render(&s, &ViewState::default(), VP);
    assert!(!row_text(&fb, 9).contains("GAME OVER"));

    s.status = GameStatus::LevelComplete;
    let fb = view.render(&s, &ViewState::default(), VP);
    assert!(row_text(&fb, 9).contains("LEVEL COMPLETE"));
    assert!(row_text(&fb, 10).contains("n: next level"));

    s.status = GameStatus::GameOver;
    let fb = view.render(&s, &ViewState::default(), VP);
    assert!(row_text(&fb, 9).contains("GAME OVER"));

    s.all_levels_cleared = true;
    let fb = view.render(&s, &ViewState::default(), VP);
    assert!(row_text(&fb, 9).contains("ALL LEVELS CLEARED"));
}

#[test]
fn board_view_highlights_cursor_and_hint() {
    let view = BoardView::default();
    let plain = view.render(&snap(), &ViewState::default(), VP);
    let ui = ViewState {
        cursor: Some(Coord::new(4, 4)),
        hint: Some(Swap::new(Coord::new(6, 0), Coord::new(6, 1))),
        ..ViewState::default()
    };
    let fb = view.render(&snap(), &ui, VP);

    let bg = |fb: &FrameBuffer, at: Coord| {
        let (x, y) = glyph_pos(at);
        fb.get(x, y).unwrap().style.bg
    };
    assert_ne!(bg(&fb, Coord::new(4, 4)), bg(&plain, Coord::new(4, 4)));
    assert_ne!(bg(&fb, Coord::new(6, 1)), bg(&plain, Coord::new(6, 1)));
    assert_eq!(bg(&fb, Coord::new(0, 0)), bg(&plain, Coord::new(0, 0)));
}

#[test]
fn board_view_draws_playback_frames_instead_of_snapshot() {
    let mut rows = QUIET;
    rows[3] = "GYYRYPGO";
    let s = session(&rows);
    let out = s
        .attempt_swap(Coord::new(3, 3), Coord::new(3, 4))
        .unwrap();
    let frames = frames_for(&out.trace);
    let cleared = frames
        .iter()
        .find(|f| f.kind == FrameKind::Cleared)
        .unwrap();

    let view = BoardView::default();
    let ui = ViewState {
        frame: Some(cleared),
        ..ViewState::default()
    };
    let fb = view.render(&out.session.snapshot(), &ui, VP);
    // Emptied cells show a dot in the middle of the cell.
    let (x, y) = glyph_pos(Coord::new(3, 1));
    assert_eq!(fb.get(x + 1, y).unwrap().ch, '·');
}

#[test]
fn render_into_reuses_framebuffer_and_diffs_are_small() {
    let view = BoardView::default();
    let mut fb = FrameBuffer::new(0, 0);
    view.render_into(&snap(), &ViewState::default(), VP, &mut fb);
    assert_eq!((fb.width(), fb.height()), (60, 20));
    let prev = fb.clone();

    let mut full = Vec::new();
    encode_full_into(&fb, &mut full).unwrap();

    let mut s = snap();
    s.score = 10;
    view.render_into(&s, &ViewState::default(), VP, &mut fb);
    let mut diff = Vec::new();
    encode_diff_into(&prev, &fb, &mut diff).unwrap();
    assert!(!diff.is_empty());
    assert!(diff.len() < full.len());

    let mut none = Vec::new();
    encode_diff_into(&fb, &fb, &mut none).unwrap();
    assert!(none.len() < diff.len());
}
