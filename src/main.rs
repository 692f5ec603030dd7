//! Terminal match-three runner (default binary).
//!
//! Keyboard and mouse play on a crossterm framebuffer renderer, settle
//! cycles replayed through `Playback`, and an optional agent adapter.
//!
//! Environment: `MATCH3_SEED` fixes the board stream, `MATCH3_LOG_PATH`
//! enables file logging, `MATCH3_AI_*` configure the adapter.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEventKind};
use tracing::{debug, info, warn};

use tui_match3::adapter::{Adapter, AgentHost};
use tui_match3::core::{EngineError, GameSession};
use tui_match3::engine::best_move;
use tui_match3::input::{handle_key_event, should_quit, Cursor, GestureTracker, KeyInput};
use tui_match3::term::{
    AdapterStatusView, BoardView, FrameBuffer, Playback, TerminalRenderer, ViewState, Viewport,
};
use tui_match3::types::{Coord, GameStatus, Swap, LEVELS};

/// Redraw cadence while idle or animating.
const FRAME_MS: u64 = 16;

/// Pointer units per terminal column / row, so that dragging across one
/// board cell (4x2 characters) clears the drag threshold.
const POINTER_X: i32 = 10;
const POINTER_Y: i32 = 20;

fn main() -> Result<()> {
    tui_match3::logging::init_from_env()?;

    let seed = seed_from_env();
    info!(seed, "starting");

    let mut adapter = match Adapter::start_from_env() {
        Ok(adapter) => adapter,
        Err(e) => {
            warn!(error = %e, "agent adapter disabled");
            None
        }
    };
    if let Some(a) = adapter.as_ref() {
        info!(addr = %a.local_addr(), "agent adapter ready");
    }

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, adapter.as_mut(), seed);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn seed_from_env() -> u64 {
    std::env::var("MATCH3_SEED")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(1)
        })
}

/// Animation in progress, with the score the session had before the swap.
struct Animation {
    playback: Playback,
    base_score: u32,
}

struct App {
    session: GameSession,
    cursor: Cursor,
    gesture: GestureTracker,
    /// Cell under the pointer when the button went down
    pressed: Option<Coord>,
    hint: Option<Swap>,
    animation: Option<Animation>,
    host: AgentHost,
}

impl App {
    fn new(seed: u64) -> Result<Self> {
        Ok(Self {
            session: GameSession::new(&LEVELS, seed)?,
            cursor: Cursor::new(),
            gesture: GestureTracker::default(),
            pressed: None,
            hint: None,
            animation: None,
            host: AgentHost::new(),
        })
    }

    fn try_swap(&mut self, swap: Swap, adapter: Option<&mut Adapter>) -> Result<()> {
        match self.session.apply_swap(swap) {
            Ok(outcome) => {
                self.host.record(&outcome.trace);
                self.animation = Some(Animation {
                    playback: Playback::new(&outcome.trace),
                    base_score: self.session.score(),
                });
                self.session = outcome.session;
                self.hint = None;
                self.broadcast(adapter);
                Ok(())
            }
            Err(e) => self.refused(e),
        }
    }

    fn next_level(&mut self, adapter: Option<&mut Adapter>) -> Result<()> {
        match self.session.advance_level(&LEVELS) {
            Ok(next) => {
                self.session = next;
                self.hint = None;
                self.cursor.clear_selection();
                self.broadcast(adapter);
                Ok(())
            }
            Err(e) => self.refused(e),
        }
    }

    fn restart(&mut self, adapter: Option<&mut Adapter>) -> Result<()> {
        self.session = self.session.restart(&LEVELS)?;
        self.host.reset();
        self.hint = None;
        self.animation = None;
        self.cursor = Cursor::new();
        self.broadcast(adapter);
        Ok(())
    }

    fn refused(&self, e: EngineError) -> Result<()> {
        if e.is_recoverable() {
            debug!(error = %e, "input ignored");
            Ok(())
        } else {
            Err(e.into())
        }
    }

    fn broadcast(&mut self, adapter: Option<&mut Adapter>) {
        if let Some(a) = adapter {
            a.send(self.host.broadcast(&self.session));
        }
    }

    fn on_key(&mut self, input: KeyInput, adapter: Option<&mut Adapter>) -> Result<()> {
        match input {
            KeyInput::Hint => {
                self.hint = best_move(self.session.board()).map(|m| m.swap);
                if let Some(h) = self.hint {
                    self.cursor.set_pos(h.from);
                }
                Ok(())
            }
            KeyInput::NextLevel => self.next_level(adapter),
            KeyInput::Restart => self.restart(adapter),
            KeyInput::Move(_) | KeyInput::Select => match self.cursor.apply(input) {
                Some(swap) => self.try_swap(swap, adapter),
                None => Ok(()),
            },
        }
    }

    fn drain_adapter(&mut self, adapter: &mut Adapter) {
        while let Some(inbound) = adapter.try_recv() {
            let handled = self.host.handle(&mut self.session, &LEVELS, &inbound);
            if let Some(trace) = handled.trace.as_ref() {
                let base_score = self.session.score().saturating_sub(trace.score_gained());
                self.animation = Some(Animation {
                    playback: Playback::new(trace),
                    base_score,
                });
                self.hint = None;
            }
            for reply in handled.replies {
                adapter.send(reply);
            }
        }
    }
}

fn run(term: &mut TerminalRenderer, mut adapter: Option<&mut Adapter>, seed: u64) -> Result<()> {
    let mut app = App::new(seed)?;
    let view = BoardView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let frame_duration = Duration::from_millis(FRAME_MS);
    let mut last_frame = Instant::now();

    loop {
        if let Some(a) = adapter.as_deref_mut() {
            app.drain_adapter(a);
        }

        // Advance animation.
        let dt = last_frame.elapsed();
        last_frame = Instant::now();
        if let Some(anim) = app.animation.as_mut() {
            anim.playback.tick(dt.as_millis() as u32);
            if anim.playback.is_finished() {
                app.animation = None;
            }
        }

        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        let mut snap = app.session.snapshot();
        let frame = app.animation.as_ref().and_then(|anim| {
            let frame = anim.playback.current()?;
            snap.score = anim.base_score.saturating_add(frame.score_gained);
            snap.status = GameStatus::Playing;
            Some(frame)
        });
        let status = adapter.as_deref().map(|a| AdapterStatusView {
            enabled: true,
            client_count: a.stats().client_count().min(u16::MAX as usize) as u16,
            controller_id: a.stats().controller_id(),
        });
        let ui = ViewState {
            cursor: Some(app.cursor.pos()),
            selected: app.cursor.selected(),
            hint: app.hint,
            frame,
            adapter: status.as_ref(),
        };
        view.render_into(&snap, &ui, viewport, &mut fb);
        term.draw_swap(&mut fb)?;

        if !event::poll(frame_duration)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if should_quit(key) {
                    return Ok(());
                }
                // Any key skips a running animation.
                if let Some(anim) = app.animation.as_mut() {
                    anim.playback.skip();
                    app.animation = None;
                    continue;
                }
                if let Some(input) = handle_key_event(key) {
                    app.on_key(input, adapter.as_deref_mut())?;
                }
            }
            Event::Mouse(mouse) => {
                let (px, py) = (mouse.column as i32 * POINTER_X, mouse.row as i32 * POINTER_Y);
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        app.pressed = view.cell_at(viewport, mouse.column, mouse.row);
                        match app.pressed {
                            Some(cell) => app.gesture.press(cell, px, py),
                            None => app.gesture.cancel(),
                        }
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        let pressed = app.pressed.take();
                        if app.animation.is_some() {
                            app.gesture.cancel();
                            continue;
                        }
                        if let Some(swap) = app.gesture.release(px, py) {
                            app.cursor.clear_selection();
                            app.cursor.set_pos(swap.to);
                            app.try_swap(swap, adapter.as_deref_mut())?;
                        } else if let Some(cell) = pressed {
                            // A press without a drag works like a click.
                            if let Some(swap) = app.cursor.click(cell) {
                                app.try_swap(swap, adapter.as_deref_mut())?;
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Resize(_, _) => term.invalidate(),
            _ => {}
        }
    }
}
