//! Board module - manages the tile grid
//!
//! The board is an N×N grid (N = 4, 5 or 6) where each cell holds a tile value.
//! Uses a fixed-capacity flat array for cache locality and zero allocation; only
//! the first `side * side` entries are in use, the rest stay zero.
//! Coordinates: (row, col) where row 0 is the top edge and col 0 the left edge.

use std::fmt;

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::types::{BoardSize, Tile, MAX_BOARD_SIDE, MAX_CELLS, MAX_TILE};

/// Rejected board input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board must have 4, 5 or 6 rows, got {0}")]
    UnsupportedSize(usize),
    #[error("row {row} has {len} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("cell ({row}, {col}) holds {value}, which is neither 0 nor a power of two in 2..=2^30")]
    InvalidTile { row: usize, col: usize, value: Tile },
}

/// Whether a value may sit in a cell.
#[inline]
pub fn is_valid_tile(value: Tile) -> bool {
    value == 0 || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

/// The game board - square grid using flat array storage
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    size: BoardSize,
    /// Flat array of cells, row-major order (row * side + col)
    cells: [Tile; MAX_CELLS],
}

impl Board {
    /// Create a new empty board
    pub fn new(size: BoardSize) -> Self {
        Self {
            size,
            cells: [0; MAX_CELLS],
        }
    }

    /// Build a board from rows of tile values.
    ///
    /// ```
    /// use nexus_2048_core::Board;
    ///
    /// let board = Board::from_rows(&[
    ///     [2, 0, 0, 0],
    ///     [0, 4, 0, 0],
    ///     [0, 0, 0, 0],
    ///     [0, 0, 0, 8],
    /// ])
    /// .unwrap();
    /// assert_eq!(board.get(1, 1), Some(4));
    /// assert!(Board::from_rows(&[[3, 0, 0, 0]; 4]).is_err());
    /// ```
    pub fn from_rows<R: AsRef<[Tile]>>(rows: &[R]) -> Result<Self, BoardError> {
        let side = rows.len();
        let size = u8::try_from(side)
            .ok()
            .and_then(BoardSize::from_side)
            .ok_or(BoardError::UnsupportedSize(side))?;

        let mut board = Self::new(size);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != side {
                return Err(BoardError::RaggedRow {
                    row,
                    len: values.len(),
                    expected: side,
                });
            }
            for (col, &value) in values.iter().enumerate() {
                if !is_valid_tile(value) {
                    return Err(BoardError::InvalidTile { row, col, value });
                }
                board.cells[row * side + col] = value;
            }
        }
        Ok(board)
    }

    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        let side = self.side();
        if row >= side || col >= side {
            return None;
        }
        Some(row * side + col)
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    /// Side length in cells
    pub fn side(&self) -> usize {
        self.size.side() as usize
    }

    /// Get tile at (row, col). Returns None if out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        self.index(row, col).map(|idx| self.cells[idx])
    }

    /// Set tile at (row, col). Returns false if out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: Tile) -> bool {
        debug_assert!(is_valid_tile(value), "invalid tile value {value}");
        match self.index(row, col) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => false,
        }
    }

    /// Set tile by row-major index. Returns false if out of bounds.
    pub fn set_index(&mut self, index: usize, value: Tile) -> bool {
        debug_assert!(is_valid_tile(value), "invalid tile value {value}");
        if index >= self.size.cells() {
            return false;
        }
        self.cells[index] = value;
        true
    }

    /// The in-use cells, row-major.
    pub fn cells(&self) -> &[Tile] {
        &self.cells[..self.size.cells()]
    }

    pub fn row(&self, row: usize) -> &[Tile] {
        let side = self.side();
        &self.cells[row * side..(row + 1) * side]
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [Tile] {
        let side = self.side();
        &mut self.cells[row * side..(row + 1) * side]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> + '_ {
        self.cells().chunks(self.side())
    }

    /// Row-major indices of empty cells (no allocation).
    pub fn empty_cells(&self) -> ArrayVec<u8, MAX_CELLS> {
        self.cells()
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(|(i, _)| i as u8)
            .collect()
    }

    pub fn empty_count(&self) -> usize {
        self.cells().iter().filter(|&&v| v == 0).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells().iter().all(|&v| v != 0)
    }

    pub fn is_empty(&self) -> bool {
        self.cells().iter().all(|&v| v == 0)
    }

    /// Highest tile on the board (0 when empty).
    pub fn max_tile(&self) -> Tile {
        self.cells().iter().copied().max().unwrap_or(0)
    }

    /// Sum of all tile values.
    pub fn tile_sum(&self) -> u64 {
        self.cells().iter().map(|&v| v as u64).sum()
    }

    /// True if two horizontally or vertically adjacent cells hold the same
    /// mergeable value. [`MAX_TILE`] pairs do not count.
    pub fn has_adjacent_equal(&self) -> bool {
        let side = self.side();
        for row in 0..side {
            for col in 0..side {
                let v = self.cells[row * side + col];
                if v == 0 || v >= MAX_TILE {
                    continue;
                }
                if col + 1 < side && self.cells[row * side + col + 1] == v {
                    return true;
                }
                if row + 1 < side && self.cells[(row + 1) * side + col] == v {
                    return true;
                }
            }
        }
        false
    }

    /// Mirror along the main diagonal.
    pub(crate) fn transpose(&mut self) {
        let side = self.side();
        for row in 0..side {
            for col in (row + 1)..side {
                self.cells.swap(row * side + col, col * side + row);
            }
        }
    }

    /// Reverse every row in place (left/right mirror).
    pub(crate) fn reverse_rows(&mut self) {
        for row in 0..self.side() {
            self.row_mut(row).reverse();
        }
    }

    /// Copy into a fixed-size grid; cells outside the board are zeroed.
    pub fn write_grid(&self, out: &mut [[Tile; MAX_BOARD_SIDE as usize]; MAX_BOARD_SIDE as usize]) {
        let side = self.side();
        for (r, out_row) in out.iter_mut().enumerate() {
            for (c, cell) in out_row.iter_mut().enumerate() {
                *cell = if r < side && c < side {
                    self.cells[r * side + c]
                } else {
                    0
                };
            }
        }
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells = [0; MAX_CELLS];
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardSize::Four)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rows()).finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for (i, v) in row.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                if *v == 0 {
                    write!(f, "{:>6}", ".")?;
                } else {
                    write!(f, "{:>6}", v)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_index_calculation() {
        let board = Board::new(BoardSize::Four);
        assert_eq!(board.index(0, 0), Some(0));
        assert_eq!(board.index(0, 3), Some(3));
        assert_eq!(board.index(1, 0), Some(4));
        assert_eq!(board.index(3, 3), Some(15));
        assert_eq!(board.index(4, 0), None);
        assert_eq!(board.index(0, 4), None);

        let board = Board::new(BoardSize::Six);
        assert_eq!(board.index(5, 5), Some(35));
    }

    #[test]
    fn test_from_rows_validation() {
        assert_eq!(
            Board::from_rows(&[[0u32; 3]; 3]),
            Err(BoardError::UnsupportedSize(3))
        );

        let ragged: Vec<Vec<Tile>> = vec![vec![0; 4], vec![0; 4], vec![0; 3], vec![0; 4]];
        assert_eq!(
            Board::from_rows(&ragged),
            Err(BoardError::RaggedRow {
                row: 2,
                len: 3,
                expected: 4
            })
        );

        let mut rows = [[0u32; 4]; 4];
        rows[1][2] = 1;
        assert_eq!(
            Board::from_rows(&rows),
            Err(BoardError::InvalidTile {
                row: 1,
                col: 2,
                value: 1
            })
        );
    }

    #[test]
    fn test_empty_cells_and_fullness() {
        let mut board = Board::new(BoardSize::Four);
        assert_eq!(board.empty_count(), 16);
        assert!(board.is_empty());

        board.set(0, 1, 2);
        board.set(3, 3, 4);
        let empty = board.empty_cells();
        assert_eq!(empty.len(), 14);
        assert!(!empty.contains(&1));
        assert!(!empty.contains(&15));
        assert_eq!(board.max_tile(), 4);
        assert_eq!(board.tile_sum(), 6);
    }

    #[test]
    fn test_transpose_and_reverse() {
        let mut board = Board::from_rows(&[
            [2, 4, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 8, 0],
            [0, 0, 0, 16],
        ])
        .unwrap();

        board.transpose();
        assert_eq!(board.get(1, 0), Some(4));
        assert_eq!(board.get(0, 1), Some(0));
        assert_eq!(board.get(3, 3), Some(16));

        board.transpose();
        board.reverse_rows();
        assert_eq!(board.row(0), &[0, 0, 4, 2]);
    }

    #[test]
    fn test_adjacent_equal_checks_both_axes() {
        let horizontal = Board::from_rows(&[
            [2, 2, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ])
        .unwrap();
        assert!(horizontal.has_adjacent_equal());

        let vertical = Board::from_rows(&[
            [0, 0, 0, 8],
            [0, 0, 0, 8],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ])
        .unwrap();
        assert!(vertical.has_adjacent_equal());

        let none = Board::from_rows(&[
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ])
        .unwrap();
        assert!(!none.has_adjacent_equal());
    }

    #[test]
    fn test_write_grid_zeroes_outside() {
        let mut board = Board::new(BoardSize::Four);
        board.set(3, 3, 32);
        let mut grid = [[7u32; 6]; 6];
        board.write_grid(&mut grid);
        assert_eq!(grid[3][3], 32);
        assert_eq!(grid[5][5], 0);
        assert_eq!(grid[0][4], 0);
    }

    #[test]
    fn test_rejects_tiles_above_cap() {
        assert!(is_valid_tile(MAX_TILE));
        assert!(!is_valid_tile(MAX_TILE << 1));
        let err = Board::from_rows(&[[1 << 31, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert!(matches!(
            err,
            Err(BoardError::InvalidTile { row: 0, col: 0, .. })
        ));
    }

    #[test]
    fn test_capped_pairs_are_not_adjacent_merges() {
        let mut board = Board::from_rows(&[
            [MAX_TILE, MAX_TILE, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ])
        .unwrap();
        assert!(!board.has_adjacent_equal());
        board.set(0, 3, 2);
        assert!(board.has_adjacent_equal());
    }
}
