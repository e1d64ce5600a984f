//! Move analysis and scripted play on top of the core session.
//!
//! - [`hint`]: legal-move masks and a greedy one-ply move choice
//! - [`play`]: batch application of actions with protocol-level errors

pub mod hint;
pub mod play;

pub use nexus_2048_core as core;
pub use nexus_2048_types as types;

pub use hint::{autoplay, best_move, has_legal_move, legal_moves};
pub use play::{apply_actions, ActionsOutcome, PlayError, MAX_ACTIONS_PER_COMMAND};
