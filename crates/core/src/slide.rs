//! Slide module - the merge/slide algorithm
//!
//! Every direction is resolved with one row primitive, [`slide_row_left`].
//! The other three directions are reversible transforms wrapped around it:
//!
//! | Direction | Before slide | After slide |
//! |-----------|--------------|-------------|
//! | Left      | -            | -           |
//! | Right     | reverse      | reverse     |
//! | Up        | transpose    | transpose   |
//! | Down      | transpose, reverse | reverse, transpose |
//!
//! Nothing here touches randomness; [`resolve_move`] is pure and deterministic.

use crate::board::Board;
use crate::types::{Direction, Tile, MAX_BOARD_SIDE, MAX_TILE};

/// Result of sliding a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowSlide {
    /// Sum of the values produced by merges.
    pub score: u64,
    pub merges: u8,
    pub changed: bool,
}

/// Result of resolving a move over the whole board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: Board,
    pub score_delta: u64,
    pub merges: u8,
    /// True iff `board` differs from the input in any cell.
    pub changed: bool,
}

/// Slide a row toward index 0, merging equal neighbours once.
///
/// Zeros are skipped (compaction), each adjacent equal pair in the compacted
/// sequence becomes one tile of double value, and a tile produced by a merge
/// never merges again in the same pass. Tiles at [`MAX_TILE`] only compact.
/// The remainder is zero-padded.
///
/// ```
/// use nexus_2048_core::slide::slide_row_left;
///
/// let mut row = [2, 2, 2, 2];
/// let result = slide_row_left(&mut row);
/// assert_eq!(row, [4, 4, 0, 0]);
/// assert_eq!(result.score, 8);
/// ```
pub fn slide_row_left(row: &mut [Tile]) -> RowSlide {
    debug_assert!(row.len() <= MAX_BOARD_SIDE as usize);

    let mut out = [0 as Tile; MAX_BOARD_SIDE as usize];
    let mut write = 0usize;
    // Last compacted value still waiting for a partner.
    let mut pending: Tile = 0;
    let mut score = 0u64;
    let mut merges = 0u8;

    for &value in row.iter().filter(|&&v| v != 0) {
        if pending == value && value < MAX_TILE {
            let merged = value * 2;
            out[write] = merged;
            write += 1;
            score += merged as u64;
            merges += 1;
            pending = 0;
        } else {
            if pending != 0 {
                out[write] = pending;
                write += 1;
            }
            pending = value;
        }
    }
    if pending != 0 {
        out[write] = pending;
    }

    let slid = &out[..row.len()];
    let changed = row != slid;
    row.copy_from_slice(slid);

    RowSlide {
        score,
        merges,
        changed,
    }
}

fn orient(board: &mut Board, direction: Direction) {
    match direction {
        Direction::Left => {}
        Direction::Right => board.reverse_rows(),
        Direction::Up => board.transpose(),
        Direction::Down => {
            board.transpose();
            board.reverse_rows();
        }
    }
}

fn restore(board: &mut Board, direction: Direction) {
    match direction {
        Direction::Left => {}
        Direction::Right => board.reverse_rows(),
        Direction::Up => board.transpose(),
        Direction::Down => {
            board.reverse_rows();
            board.transpose();
        }
    }
}

/// Compute the board after sliding toward `direction`.
///
/// The input is never modified; callers commit `outcome.board` only when
/// `outcome.changed` is true.
pub fn resolve_move(board: &Board, direction: Direction) -> MoveOutcome {
    let mut work = *board;
    orient(&mut work, direction);

    let mut score_delta = 0u64;
    let mut merges = 0u8;
    let mut changed = false;
    for row in 0..work.side() {
        let slide = slide_row_left(work.row_mut(row));
        score_delta += slide.score;
        merges += slide.merges;
        changed |= slide.changed;
    }

    restore(&mut work, direction);
    debug_assert_eq!(changed, work != *board);

    MoveOutcome {
        board: work,
        score_delta,
        merges,
        changed,
    }
}

/// Whether sliding toward `direction` would change the board.
pub fn can_move(board: &Board, direction: Direction) -> bool {
    resolve_move(board, direction).changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slid(mut row: [Tile; 4]) -> ([Tile; 4], RowSlide) {
        let result = slide_row_left(&mut row);
        (row, result)
    }

    #[test]
    fn test_merge_pairs() {
        let (row, result) = slid([2, 2, 4, 4]);
        assert_eq!(row, [4, 8, 0, 0]);
        assert_eq!(result.score, 12);
        assert_eq!(result.merges, 2);
        assert!(result.changed);
    }

    #[test]
    fn test_no_chained_merge() {
        let (row, result) = slid([2, 2, 2, 2]);
        assert_eq!(row, [4, 4, 0, 0]);
        assert_eq!(result.score, 8);

        let (row, _) = slid([4, 2, 2, 0]);
        assert_eq!(row, [4, 4, 0, 0]);
    }

    #[test]
    fn test_merge_prefers_leading_pair() {
        let (row, result) = slid([2, 2, 2, 0]);
        assert_eq!(row, [4, 2, 0, 0]);
        assert_eq!(result.score, 4);
    }

    #[test]
    fn test_merge_across_gaps() {
        let (row, result) = slid([2, 0, 0, 2]);
        assert_eq!(row, [4, 0, 0, 0]);
        assert_eq!(result.score, 4);
    }

    #[test]
    fn test_compaction_only() {
        let (row, result) = slid([0, 2, 0, 4]);
        assert_eq!(row, [2, 4, 0, 0]);
        assert_eq!(result.score, 0);
        assert_eq!(result.merges, 0);
        assert!(result.changed);
    }

    #[test]
    fn test_unchanged_rows() {
        let (row, result) = slid([0, 0, 0, 0]);
        assert_eq!(row, [0, 0, 0, 0]);
        assert!(!result.changed);

        let (row, result) = slid([2, 4, 8, 16]);
        assert_eq!(row, [2, 4, 8, 16]);
        assert!(!result.changed);

        let (_, result) = slid([2, 4, 0, 0]);
        assert!(!result.changed);
    }

    #[test]
    fn test_six_wide_row() {
        let mut row = [2, 2, 0, 4, 4, 4];
        let result = slide_row_left(&mut row);
        assert_eq!(row, [4, 8, 4, 0, 0, 0]);
        assert_eq!(result.score, 12);
    }

    #[test]
    fn test_resolve_each_direction() {
        let board = Board::from_rows(&[
            [2, 0, 0, 2],
            [0, 0, 0, 0],
            [0, 4, 0, 0],
            [0, 4, 0, 0],
        ])
        .unwrap();

        let left = resolve_move(&board, Direction::Left);
        assert_eq!(left.board.row(0), &[4, 0, 0, 0]);
        assert_eq!(left.board.row(2), &[4, 0, 0, 0]);
        assert_eq!(left.score_delta, 4);

        let right = resolve_move(&board, Direction::Right);
        assert_eq!(right.board.row(0), &[0, 0, 0, 4]);
        assert_eq!(right.board.row(3), &[0, 0, 0, 4]);

        let up = resolve_move(&board, Direction::Up);
        assert_eq!(up.board.row(0), &[2, 8, 0, 2]);
        assert_eq!(up.score_delta, 8);

        let down = resolve_move(&board, Direction::Down);
        assert_eq!(down.board.row(3), &[2, 8, 0, 2]);
        assert_eq!(down.board.row(0), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_resolve_does_not_mutate_input() {
        let board = Board::from_rows(&[
            [2, 2, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ])
        .unwrap();
        let copy = board;
        let _ = resolve_move(&board, Direction::Left);
        assert_eq!(board, copy);
    }

    #[test]
    fn test_can_move() {
        let board = Board::from_rows(&[
            [2, 4, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ])
        .unwrap();
        assert!(!can_move(&board, Direction::Left));
        assert!(!can_move(&board, Direction::Up));
        assert!(can_move(&board, Direction::Right));
        assert!(can_move(&board, Direction::Down));
    }

    #[test]
    fn test_largest_tiles_never_overflow() {
        let top = MAX_TILE;
        let half = MAX_TILE / 2;
        let board = Board::from_rows(&[
            [half, half, 0, 0],
            [top, top, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ])
        .unwrap();
        let out = resolve_move(&board, Direction::Left);
        assert_eq!(out.board.get(0, 0), Some(top));
        assert_eq!(out.board.get(1, 0), Some(top));
        assert_eq!(out.board.get(1, 1), Some(top));
        assert_eq!(out.merges, 1);
        assert_eq!(out.score_delta, top as u64);
        assert!(out
            .board
            .cells()
            .iter()
            .all(|&v| v == 0 || (v.is_power_of_two() && v <= MAX_TILE)));

        // A row of capped tiles is already settled.
        let (row, result) = slid([top, top, 0, 0]);
        assert_eq!(row, [top, top, 0, 0]);
        assert!(!result.changed);
    }
}
