//! Swipe gestures from pointer drags.
//!
//! A press followed by a release is read as a swipe toward the axis with the
//! larger travel. Terminal cells are about twice as tall as they are wide, so
//! vertical travel in rows is doubled before axes are compared.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::types::Direction;

/// Minimum travel (in columns, after row scaling) for a drag to count.
pub const DEFAULT_SWIPE_THRESHOLD: i32 = 4;

const ROW_SCALE: i32 = 2;

/// Direction of a drag along its dominant axis, if that axis travelled at
/// least `threshold`. Positive `dx` is rightward, positive `dy` downward.
pub fn direction_from_delta(dx: i32, dy: i32, threshold: i32) -> Option<Direction> {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ax.max(ay) < threshold || ax == ay {
        return None;
    }
    Some(if ax > ay {
        if dx > 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy > 0 {
        Direction::Down
    } else {
        Direction::Up
    })
}

#[derive(Debug, Clone)]
pub struct SwipeTracker {
    origin: Option<(u16, u16)>,
    threshold: i32,
}

impl SwipeTracker {
    pub fn new(threshold: i32) -> Self {
        Self {
            origin: None,
            threshold,
        }
    }

    pub fn pointer_down(&mut self, column: u16, row: u16) {
        self.origin = Some((column, row));
    }

    /// Finish a gesture; returns its direction if it was long enough.
    pub fn pointer_up(&mut self, column: u16, row: u16) -> Option<Direction> {
        let (x0, y0) = self.origin.take()?;
        let dx = column as i32 - x0 as i32;
        let dy = (row as i32 - y0 as i32) * ROW_SCALE;
        direction_from_delta(dx, dy, self.threshold)
    }

    pub fn cancel(&mut self) {
        self.origin = None;
    }

    /// Feed a crossterm mouse event (left button only).
    pub fn handle_mouse_event(&mut self, event: MouseEvent) -> Option<Direction> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer_down(event.column, event.row);
                None
            }
            MouseEventKind::Up(MouseButton::Left) => self.pointer_up(event.column, event.row),
            _ => None,
        }
    }
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}
