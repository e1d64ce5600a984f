//! Bounded FIFO of pending moves.
//!
//! Input arrives faster than the game loop resolves moves. Directions wait
//! here and are taken one per frame; once full, further input is dropped
//! rather than queued without bound.

use arrayvec::ArrayVec;

use crate::types::{Direction, MOVE_QUEUE_CAPACITY};

#[derive(Debug, Clone, Default)]
pub struct MoveQueue {
    pending: ArrayVec<Direction, MOVE_QUEUE_CAPACITY>,
}

impl MoveQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a direction. Returns false if it was dropped.
    pub fn push(&mut self, direction: Direction) -> bool {
        self.pending.try_push(direction).is_ok()
    }

    /// Oldest pending direction.
    pub fn pop(&mut self) -> Option<Direction> {
        if self.pending.is_empty() {
            return None;
        }
        Some(self.pending.remove(0))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
