use rand::RngCore;

use crate::core::GameState;
use crate::types::GameAction;

/// Upper bound on actions accepted in one batch.
pub const MAX_ACTIONS_PER_COMMAND: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayError {
    EmptyBatch,
    TooManyActions,
    NotPlayable,
}

impl PlayError {
    pub fn code(self) -> &'static str {
        match self {
            PlayError::EmptyBatch | PlayError::TooManyActions => "invalid_command",
            PlayError::NotPlayable => "not_playable",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlayError::EmptyBatch => "actions must not be empty",
            PlayError::TooManyActions => "too many actions in one command",
            PlayError::NotPlayable => "game is not accepting moves",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionsOutcome {
    /// Actions that changed the session.
    pub applied: u32,
    pub changed: bool,
}

/// Apply a batch of actions in order.
///
/// A batch that opens with a move while the session is not accepting moves is
/// rejected up front. Moves that become no-ops part way through (the game
/// ended, or the direction was blocked) are skipped.
pub fn apply_actions<R: RngCore>(
    state: &mut GameState<R>,
    actions: &[GameAction],
) -> Result<ActionsOutcome, PlayError> {
    if actions.is_empty() {
        return Err(PlayError::EmptyBatch);
    }
    if actions.len() > MAX_ACTIONS_PER_COMMAND {
        return Err(PlayError::TooManyActions);
    }

    let keep_playing = state.config().keep_playing_after_win;
    if matches!(actions[0], GameAction::Move(_)) && !state.phase().accepts_moves(keep_playing) {
        return Err(PlayError::NotPlayable);
    }

    let mut outcome = ActionsOutcome::default();
    for &action in actions {
        if state.apply_action(action) {
            outcome.applied += 1;
            outcome.changed = true;
        }
    }
    Ok(outcome)
}
