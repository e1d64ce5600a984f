//! Builds observation payloads from a live session.

use std::hash::Hasher;

use rand::RngCore;

use crate::core::GameState;
use crate::engine::legal_moves;
use crate::protocol::{
    current_timestamp_ms, BoardSnapshot, LastEvent, LegalMoves, ObservationMessage,
    ObservationType, StateHash,
};
use crate::types::CoreEvent;

/// Stable 64-bit FNV-1a hasher for `state_hash`.
///
/// `DefaultHasher` output may change between Rust releases, so it is not used
/// for anything sent over the wire.
#[derive(Debug, Clone)]
pub struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Snapshot `state` into an observation numbered `seq`.
///
/// The hash covers the board and every scalar a client might branch on, and
/// none of the timing fields.
pub fn build_observation<R: RngCore>(
    state: &GameState<R>,
    seq: u64,
    last_event: Option<CoreEvent>,
) -> ObservationMessage {
    let snap = state.snapshot();

    let mut hasher = Fnv1aHasher::new();
    hasher.write_u8(snap.side);
    for &cell in state.board().cells() {
        hasher.write_u32(cell);
    }
    hasher.write_u64(snap.score);
    hasher.write_u32(snap.move_count);
    hasher.write(snap.phase.as_str().as_bytes());
    hasher.write_u8(snap.won as u8);
    hasher.write_u32(snap.episode_id);
    hasher.write_u32(snap.target_tile);

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        phase: snap.phase.as_str(),
        board: BoardSnapshot {
            size: snap.side,
            cells: snap.cells,
        },
        score: snap.score,
        move_count: snap.move_count,
        highest_tile: snap.highest_tile,
        target_tile: snap.target_tile,
        won: snap.won,
        game_over: snap.game_over(),
        episode_id: snap.episode_id,
        legal_moves: LegalMoves(legal_moves(state.board())),
        last_event: last_event.map(LastEvent::from),
        state_hash: StateHash(hasher.finish()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Board, SimpleRng};
    use crate::types::{Direction, GameConfig};

    #[test]
    fn test_fnv1a_known_vector() {
        let mut h = Fnv1aHasher::new();
        h.write(b"a");
        assert_eq!(h.finish(), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn test_state_hash_is_deterministic() {
        let mut a = GameState::new(GameConfig::default().with_seed(8));
        let mut b = GameState::new(GameConfig::default().with_seed(8));
        a.start();
        b.start();
        assert_eq!(
            build_observation(&a, 1, None).state_hash,
            build_observation(&b, 2, None).state_hash
        );
    }

    #[test]
    fn test_state_hash_changes_after_move() {
        let board = Board::from_rows(&[[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        let mut state = GameState::from_board(GameConfig::default(), board, SimpleRng::new(1));
        let before = build_observation(&state, 1, None);
        assert!(state.apply_move(Direction::Right).changed);
        let event = state.take_events().first().copied();
        let after = build_observation(&state, 2, event);

        assert_ne!(before.state_hash, after.state_hash);
        assert_eq!(after.move_count, 1);
        assert!(matches!(after.last_event, Some(LastEvent::Moved { direction: "right", .. })));
    }

    #[test]
    fn test_observation_json_shape() {
        let mut state = GameState::new(GameConfig::for_level(10).with_seed(3));
        state.start();
        let v = serde_json::to_value(build_observation(&state, 5, None)).unwrap();
        assert_eq!(v["type"], "observation");
        assert_eq!(v["seq"], 5);
        assert_eq!(v["phase"], "playing");
        assert_eq!(v["board"]["size"], 5);
        assert_eq!(v["board"]["cells"].as_array().unwrap().len(), 5);
        assert!(v["last_event"].is_null());
        assert_eq!(v["state_hash"].as_str().unwrap().len(), 16);
        assert!(!v["legal_moves"].as_array().unwrap().is_empty());
    }
}
