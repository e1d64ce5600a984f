//! Terminal input module (engine-facing).
//!
//! Independent of any UI framework. Maps `crossterm` key and mouse events into
//! [`crate::types::GameAction`]s and serializes rapid input through a bounded
//! queue so the game loop resolves one move at a time.

pub mod map;
pub mod queue;
pub mod swipe;

pub use nexus_2048_types as types;

pub use map::{handle_key_event, is_hint_key, is_press, should_quit};
pub use queue::MoveQueue;
pub use swipe::{direction_from_delta, SwipeTracker};
