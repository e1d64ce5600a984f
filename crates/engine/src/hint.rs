use rand::RngCore;

use crate::core::slide::{can_move, resolve_move, MoveOutcome};
use crate::core::{Board, GameState};
use crate::types::Direction;

/// Which directions would change the board, in [`Direction::ALL`] order.
pub fn legal_moves(board: &Board) -> [bool; 4] {
    Direction::ALL.map(|dir| can_move(board, dir))
}

pub fn has_legal_move(board: &Board) -> bool {
    Direction::ALL.iter().any(|&dir| can_move(board, dir))
}

fn highest_in_corner(board: &Board) -> bool {
    let last = board.side() - 1;
    let max = board.max_tile();
    [(0, 0), (0, last), (last, 0), (last, last)]
        .iter()
        .any(|&(r, c)| board.get(r, c) == Some(max))
}

// Ordered so that a larger key is a better move.
fn rank(outcome: &MoveOutcome) -> (u64, usize, bool) {
    (
        outcome.score_delta,
        outcome.board.empty_count(),
        highest_in_corner(&outcome.board),
    )
}

/// Greedy one-ply choice: most points, then most empty cells, then keeping
/// the highest tile in a corner. Ties go to the earlier direction in
/// [`Direction::ALL`]. `None` when no direction changes the board.
pub fn best_move(board: &Board) -> Option<Direction> {
    let mut best: Option<(Direction, (u64, usize, bool))> = None;
    for dir in Direction::ALL {
        let outcome = resolve_move(board, dir);
        if !outcome.changed {
            continue;
        }
        let key = rank(&outcome);
        match best {
            Some((_, best_key)) if best_key >= key => {}
            _ => best = Some((dir, key)),
        }
    }
    best.map(|(dir, _)| dir)
}

/// Play [`best_move`] until the session stops accepting moves or `max_moves`
/// have been made. Returns the number of moves played.
pub fn autoplay<R: RngCore>(state: &mut GameState<R>, max_moves: u32) -> u32 {
    let keep_playing = state.config().keep_playing_after_win;
    let mut played = 0;
    while played < max_moves && state.phase().accepts_moves(keep_playing) {
        let Some(dir) = best_move(state.board()) else {
            break;
        };
        if !state.apply_move(dir).changed {
            break;
        }
        played += 1;
    }
    played
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::is_game_over;
    use crate::core::SimpleRng;
    use crate::types::{GameConfig, Phase};

    #[test]
    fn test_legal_moves_mask() {
        let board = Board::from_rows(&[
            [2, 4, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ])
        .unwrap();
        // Up, Down, Left, Right
        assert_eq!(legal_moves(&board), [false, true, false, true]);
        assert!(has_legal_move(&board));
    }

    #[test]
    fn test_no_legal_move_matches_game_over() {
        let board = Board::from_rows(&[
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ])
        .unwrap();
        assert!(!has_legal_move(&board));
        assert!(is_game_over(&board));
        assert_eq!(best_move(&board), None);
    }

    #[test]
    fn test_best_move_prefers_points() {
        let board = Board::from_rows(&[
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [8, 8, 0, 2],
        ])
        .unwrap();
        let dir = best_move(&board).unwrap();
        assert!(matches!(dir, Direction::Left | Direction::Right));
        assert_eq!(resolve_move(&board, dir).score_delta, 16);
    }

    #[test]
    fn test_autoplay_stops_at_game_over_or_limit() {
        let mut state = GameState::new(GameConfig::default().with_seed(21));
        state.start();
        assert_eq!(autoplay(&mut state, 10), 10);
        assert_eq!(state.move_count(), 10);

        autoplay(&mut state, u32::MAX);
        assert_eq!(state.phase(), Phase::GameOver);
        assert!(!has_legal_move(state.board()));
    }

    #[test]
    fn test_autoplay_needs_started_session() {
        let mut state = GameState::with_rng(GameConfig::default(), SimpleRng::new(4));
        assert_eq!(autoplay(&mut state, 5), 0);
    }
}
