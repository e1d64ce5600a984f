//! Rules module - win and game-over detection, level scaling

use crate::board::Board;
use crate::types::{BoardSize, Tile};

pub use crate::types::target_tile_for_level;

/// Outcome of the post-move terminal checks. Both flags are evaluated
/// independently; a board can be won and over at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalCheck {
    pub won: bool,
    pub game_over: bool,
}

/// Any tile has reached `target`.
pub fn is_win(board: &Board, target: Tile) -> bool {
    board.cells().iter().any(|&v| v != 0 && v >= target)
}

/// No empty cell and no adjacent equal pair, so no direction can change the board.
pub fn is_game_over(board: &Board) -> bool {
    board.is_full() && !board.has_adjacent_equal()
}

pub fn check_terminal(board: &Board, target: Tile) -> TerminalCheck {
    TerminalCheck {
        won: is_win(board, target),
        game_over: is_game_over(board),
    }
}

/// Board side for a difficulty level: 0-9 → 4, 10-19 → 5, 20+ → 6.
pub fn board_size_for_level(level: u32) -> BoardSize {
    BoardSize::for_level(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slide::can_move;
    use crate::types::Direction;

    fn checkerboard() -> Board {
        Board::from_rows(&[
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ])
        .unwrap()
    }

    #[test]
    fn test_win_threshold() {
        let mut board = Board::new(BoardSize::Four);
        board.set(2, 1, 1024);
        assert!(!is_win(&board, 2048));

        board.set(0, 0, 2048);
        assert!(is_win(&board, 2048));
        assert!(!is_win(&board, 4096));
    }

    #[test]
    fn test_checkerboard_is_game_over() {
        let board = checkerboard();
        assert!(is_game_over(&board));
        for dir in Direction::ALL {
            assert!(!can_move(&board, dir));
        }
    }

    #[test]
    fn test_one_pair_keeps_game_alive() {
        let mut board = checkerboard();
        board.set(3, 3, 4);
        assert!(!is_game_over(&board));
    }

    #[test]
    fn test_empty_cell_keeps_game_alive() {
        let mut board = checkerboard();
        board.set(1, 1, 0);
        assert!(!is_game_over(&board));
    }

    #[test]
    fn test_check_terminal_reports_both() {
        let board = Board::from_rows(&[
            [2048, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ])
        .unwrap();
        assert_eq!(
            check_terminal(&board, 2048),
            TerminalCheck {
                won: true,
                game_over: true
            }
        );
    }

    #[test]
    fn test_level_scaling() {
        assert_eq!(board_size_for_level(0), BoardSize::Four);
        assert_eq!(board_size_for_level(19), BoardSize::Five);
        assert_eq!(board_size_for_level(20), BoardSize::Six);
        assert_eq!(target_tile_for_level(14), 8192);
    }
}
