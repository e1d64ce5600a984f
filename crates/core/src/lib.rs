//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the tile-merge rules and session state. It depends only
//! on `arrayvec`, `rand` and `thiserror`, with no UI, networking or I/O,
//! making it:
//!
//! - **Deterministic**: Same seed produces identical games (replays, agents)
//! - **Testable**: Every rule is a plain function over a [`Board`] value
//! - **Fast**: Boards are `Copy` and moves never allocate
//!
//! # Module Structure
//!
//! - [`board`]: square grid of tile values (4×4 up to 6×6)
//! - [`slide`]: the slide/merge algorithm for all four directions
//! - [`spawn`]: random tile placement (the only source of randomness)
//! - [`rules`]: win and game-over detection, level scaling
//! - [`rng`]: seeded LCG implementing `rand::RngCore`
//! - [`game_state`]: the session controller and its event queue
//! - [`snapshot`]: fixed-size copies for renderers and adapters
//!
//! # Example
//!
//! ```
//! use nexus_2048_core::GameState;
//! use nexus_2048_types::{Direction, GameAction, GameConfig};
//!
//! let mut game = GameState::new(GameConfig::for_level(0).with_seed(12345));
//! game.start();
//! assert_eq!(game.board().empty_count(), 14);
//!
//! // Some direction always changes a fresh board.
//! let moved = Direction::ALL
//!     .iter()
//!     .any(|&dir| game.apply_action(GameAction::Move(dir)));
//! assert!(moved);
//! assert_eq!(game.move_count(), 1);
//! ```

pub mod board;
pub mod game_state;
pub mod rng;
pub mod rules;
pub mod slide;
pub mod snapshot;
pub mod spawn;

pub use nexus_2048_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardError};
pub use game_state::{GameState, MoveResult, SessionObserver};
pub use rng::SimpleRng;
pub use rules::{check_terminal, is_game_over, is_win, TerminalCheck};
pub use slide::{resolve_move, MoveOutcome};
pub use snapshot::GameSnapshot;
pub use spawn::{spawn_tile, SpawnedTile};
