//! Spawn module - places new tiles
//!
//! The only place randomness enters the game. The random source is any
//! [`rand::Rng`], so sessions stay deterministic under a seeded generator.

use rand::Rng;

use crate::board::Board;
use crate::types::{Tile, SPAWN_FOUR_PROBABILITY, SPAWN_HIGH_VALUE, SPAWN_LOW_VALUE};

/// A tile placed by [`spawn_tile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpawnedTile {
    /// Row-major cell index.
    pub index: u8,
    pub row: u8,
    pub col: u8,
    pub value: Tile,
}

/// Draw a spawn value: 4 with probability 0.1, otherwise 2.
pub fn spawn_value<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_bool(SPAWN_FOUR_PROBABILITY) {
        SPAWN_HIGH_VALUE
    } else {
        SPAWN_LOW_VALUE
    }
}

/// Place one tile in a uniformly chosen empty cell.
///
/// Returns `None` and leaves the board untouched when there is no empty cell.
///
/// ```
/// use nexus_2048_core::{spawn::spawn_tile, Board, SimpleRng};
/// use nexus_2048_core::types::BoardSize;
///
/// let mut board = Board::new(BoardSize::Four);
/// let mut rng = SimpleRng::new(3);
/// let tile = spawn_tile(&mut board, &mut rng).unwrap();
/// assert!(tile.value == 2 || tile.value == 4);
/// assert_eq!(board.empty_count(), 15);
/// ```
pub fn spawn_tile<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> Option<SpawnedTile> {
    let empty = board.empty_cells();
    if empty.is_empty() {
        return None;
    }

    let index = empty[rng.gen_range(0..empty.len())];
    let value = spawn_value(rng);
    board.set_index(index as usize, value);

    let side = board.side() as u8;
    Some(SpawnedTile {
        index,
        row: index / side,
        col: index % side,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimpleRng;
    use crate::types::BoardSize;

    #[test]
    fn test_spawn_fills_an_empty_cell() {
        let mut board = Board::new(BoardSize::Five);
        let mut rng = SimpleRng::new(11);

        for placed in 1..=25 {
            let tile = spawn_tile(&mut board, &mut rng).unwrap();
            assert_eq!(board.get(tile.row as usize, tile.col as usize), Some(tile.value));
            assert_eq!(board.empty_count(), 25 - placed);
        }
        assert!(board.is_full());
    }

    #[test]
    fn test_spawn_on_full_board_is_none() {
        let mut board = Board::from_rows(&[
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ])
        .unwrap();
        let before = board;
        let mut rng = SimpleRng::new(1);
        assert_eq!(spawn_tile(&mut board, &mut rng), None);
        assert_eq!(board, before);
    }

    #[test]
    fn test_spawn_uses_only_remaining_cell() {
        let mut board = Board::from_rows(&[
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 0, 4],
            [4, 2, 4, 2],
        ])
        .unwrap();
        let mut rng = SimpleRng::new(5);
        let tile = spawn_tile(&mut board, &mut rng).unwrap();
        assert_eq!((tile.row, tile.col, tile.index), (2, 2, 10));
    }

    #[test]
    fn test_spawn_is_deterministic_per_seed() {
        let mut a = Board::new(BoardSize::Four);
        let mut b = Board::new(BoardSize::Four);
        let mut rng_a = SimpleRng::new(77);
        let mut rng_b = SimpleRng::new(77);
        for _ in 0..8 {
            assert_eq!(
                spawn_tile(&mut a, &mut rng_a),
                spawn_tile(&mut b, &mut rng_b)
            );
        }
    }
}
