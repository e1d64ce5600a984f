use crate::spawn::SpawnedTile;
use crate::types::{Phase, Tile, MAX_BOARD_SIDE};

const SIDE: usize = MAX_BOARD_SIDE as usize;

/// Fixed-size copy of a session, filled without allocation.
///
/// `cells` always has room for the largest board; only the top-left
/// `side × side` block is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub side: u8,
    pub cells: [[Tile; SIDE]; SIDE],
    pub phase: Phase,
    pub score: u64,
    pub highest_tile: Tile,
    pub move_count: u32,
    pub target_tile: Tile,
    pub level: u32,
    pub won: bool,
    pub won_at_move: Option<u32>,
    pub keep_playing_after_win: bool,
    pub episode_id: u32,
    pub seed: u32,
    pub last_spawn: Option<SpawnedTile>,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn tile(&self, row: usize, col: usize) -> Tile {
        if row >= self.side as usize || col >= self.side as usize {
            return 0;
        }
        self.cells[row][col]
    }

    pub fn game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Whether moves are currently applied.
    pub fn playable(&self) -> bool {
        self.phase.accepts_moves(self.keep_playing_after_win)
    }

    /// True only on the move that reached the target.
    pub fn just_won(&self) -> bool {
        self.won_at_move == Some(self.move_count)
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            side: 4,
            cells: [[0; SIDE]; SIDE],
            phase: Phase::Idle,
            score: 0,
            highest_tile: 0,
            move_count: 0,
            target_tile: 2048,
            level: 0,
            won: false,
            won_at_move: None,
            keep_playing_after_win: true,
            episode_id: 0,
            seed: 0,
            last_spawn: None,
        }
    }
}
