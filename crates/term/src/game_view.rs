//! GameView: maps a `core::GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). Everything time-dependent arrives through
//! [`HudInfo`], so a frame is a function of its inputs and can be unit-tested.

use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::tiles::{tile_label, tile_style};
use crate::types::{Direction, SPAWN_FLASH_MS};

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
    pub client_count: u16,
    pub controller_id: Option<u64>,
    pub streaming_count: u16,
}

/// Per-frame inputs that are not part of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HudInfo {
    pub best_score: u64,
    /// Suggested move, shown under the board.
    pub hint: Option<Direction>,
    /// Milliseconds since the last tile spawned.
    pub spawn_age_ms: Option<u32>,
    /// `None` when the adapter is disabled.
    pub adapter: Option<AdapterStatusView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Tile geometry in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    tile_w: u16,
    tile_h: u16,
    gap_x: u16,
    gap_y: u16,
}

const REGULAR: Layout = Layout {
    tile_w: 7,
    tile_h: 3,
    gap_x: 1,
    gap_y: 1,
};

const COMPACT: Layout = Layout {
    tile_w: 6,
    tile_h: 1,
    gap_x: 1,
    gap_y: 0,
};

// Lines below the frame (hint or key help).
const FOOTER_H: u16 = 2;

const PANEL_MIN_W: u16 = 12;

impl Layout {
    fn frame_size(&self, side: u16) -> (u16, u16) {
        let w = side * self.tile_w + (side + 1) * self.gap_x + 2;
        let h = side * self.tile_h + (side + 1) * self.gap_y + 2;
        (w, h)
    }

    fn tile_origin(&self, frame_x: u16, frame_y: u16, row: u16, col: u16) -> (u16, u16) {
        (
            frame_x + 1 + self.gap_x + col * (self.tile_w + self.gap_x),
            frame_y + 1 + self.gap_y + row * (self.tile_h + self.gap_y),
        )
    }
}

const BOARD_BG: CellStyle = CellStyle::new(Rgb::new(90, 84, 78), Rgb::new(40, 37, 34));
const BORDER: CellStyle = CellStyle::new(Rgb::new(187, 173, 160), Rgb::new(0, 0, 0));
const LABEL: CellStyle = CellStyle::new(Rgb::new(220, 220, 220), Rgb::new(0, 0, 0)).bold();
const VALUE: CellStyle = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
const FLASH: CellStyle = CellStyle::new(Rgb::new(119, 110, 101), Rgb::new(255, 250, 235)).bold();
const OVERLAY: CellStyle = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();

/// A lightweight terminal renderer for the tile board.
pub struct GameView {
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        Self {
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    fn layout_for(&self, side: u16, viewport: Viewport) -> Layout {
        let (w, h) = REGULAR.frame_size(side);
        if w <= viewport.width && h + FOOTER_H <= viewport.height {
            REGULAR
        } else {
            COMPACT
        }
    }

    /// Render into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        hud: &HudInfo,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let side = snap.side as u16;
        let layout = self.layout_for(side, viewport);
        let (frame_w, frame_h) = layout.frame_size(side);

        let start_x = viewport.width.saturating_sub(frame_w) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h + FOOTER_H) / 2,
            AnchorY::Top => 0,
        };

        fb.fill_rect(start_x + 1, start_y + 1, frame_w - 2, frame_h - 2, ' ', BOARD_BG);
        draw_border(fb, start_x, start_y, frame_w, frame_h, BORDER);

        let flash = match (snap.last_spawn, hud.spawn_age_ms) {
            (Some(tile), Some(age)) if age < SPAWN_FLASH_MS => Some((tile.row, tile.col)),
            _ => None,
        };

        for row in 0..side {
            for col in 0..side {
                let value = snap.tile(row as usize, col as usize);
                let style = if flash == Some((row as u8, col as u8)) {
                    FLASH
                } else {
                    tile_style(value)
                };
                let (tx, ty) = layout.tile_origin(start_x, start_y, row, col);
                fb.fill_rect(tx, ty, layout.tile_w, layout.tile_h, ' ', style);
                let label = tile_label(value);
                let label = if value == 0 { "·" } else { label.as_str() };
                fb.put_str_centered(tx, ty + layout.tile_h / 2, layout.tile_w, label, style);
            }
        }

        self.draw_side_panel(fb, snap, hud, viewport, start_x + frame_w + 2, start_y);
        self.draw_footer(fb, hud, start_x, start_y + frame_h);

        let mid_y = start_y + frame_h / 2;
        if snap.game_over() {
            if snap.just_won() {
                fb.put_str_centered(start_x, mid_y.saturating_sub(1), frame_w, " YOU WIN! ", OVERLAY);
            }
            fb.put_str_centered(start_x, mid_y, frame_w, " GAME OVER ", OVERLAY);
        } else if snap.just_won() {
            fb.put_str_centered(start_x, mid_y, frame_w, " YOU WIN! ", OVERLAY);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, hud: &HudInfo, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, hud, viewport, &mut fb);
        fb
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        hud: &HudInfo,
        viewport: Viewport,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x >= viewport.width || viewport.width - panel_x < PANEL_MIN_W {
            return;
        }

        let mut y = start_y;
        let mut stat = |fb: &mut FrameBuffer, label: &str, value: u64| {
            fb.put_str(panel_x, y, label, LABEL);
            fb.put_u64(panel_x, y + 1, value, VALUE);
            y += 2;
        };
        stat(fb, "SCORE", snap.score);
        stat(fb, "BEST", hud.best_score.max(snap.score));
        stat(fb, "MOVES", snap.move_count as u64);
        stat(fb, "TARGET", snap.target_tile as u64);
        stat(fb, "LEVEL", snap.level as u64);
        stat(fb, "MAX", snap.highest_tile as u64);

        fb.put_str(panel_x, y, "AI", LABEL);
        y += 1;
        match hud.adapter {
            Some(st) => {
                let x = fb.put_str(panel_x, y, "ON ", VALUE);
                let x = fb.put_u32(x, y, st.client_count as u32, VALUE);
                fb.put_str(x, y, " clients", VALUE.dim());
                y += 1;
                let x = fb.put_str(panel_x, y, "CTRL ", VALUE);
                match st.controller_id {
                    Some(id) => fb.put_u64(x, y, id, VALUE),
                    None => fb.put_str(x, y, "-", VALUE),
                };
            }
            None => {
                fb.put_str(panel_x, y, "OFF", VALUE);
            }
        }
    }

    fn draw_footer(&self, fb: &mut FrameBuffer, hud: &HudInfo, x: u16, y: u16) {
        match hud.hint {
            Some(dir) => {
                let x = fb.put_str(x, y, "HINT: ", LABEL);
                fb.put_str(x, y, hint_arrow(dir), VALUE);
            }
            None => {
                fb.put_str(x, y, "arrows/wasd move  r restart", VALUE.dim());
                fb.put_str(x, y + 1, "? hint  q quit", VALUE.dim());
            }
        }
    }
}

fn hint_arrow(dir: Direction) -> &'static str {
    match dir {
        Direction::Up => "↑ up",
        Direction::Down => "↓ down",
        Direction::Left => "← left",
        Direction::Right => "→ right",
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}
