//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, AI protocol).
//!
//! # Board Dimensions
//!
//! Boards are square. The side length depends on the difficulty level:
//!
//! | Level | Side | Cells |
//! |-------|------|-------|
//! | 0-9   | 4    | 16    |
//! | 10-19 | 5    | 25    |
//! | 20+   | 6    | 36    |
//!
//! # Target Tile
//!
//! The tile that wins a game scales with the level:
//! `2^min(17, 11 + level / 5)`, so levels 0-4 play to 2048, 5-9 to 4096, and
//! so on up to a ceiling of 131072.
//!
//! # Spawn Weighting
//!
//! New tiles are `2` with probability 0.9 and `4` with probability 0.1.
//!
//! # Examples
//!
//! ```
//! use nexus_2048_types::{target_tile_for_level, BoardSize, Direction, GameAction};
//!
//! // Parse a direction (case-insensitive)
//! assert_eq!(Direction::from_str("LEFT"), Some(Direction::Left));
//!
//! // Parse a game action
//! assert_eq!(
//!     GameAction::from_str("up"),
//!     Some(GameAction::Move(Direction::Up))
//! );
//!
//! // Level scaling
//! assert_eq!(target_tile_for_level(0), 2048);
//! assert_eq!(BoardSize::for_level(12).side(), 5);
//! ```

/// A single cell value. `0` is empty; anything else is a power of two >= 2.
pub type Tile = u32;

/// Smallest supported board side.
pub const MIN_BOARD_SIDE: u8 = 4;

/// Largest supported board side.
pub const MAX_BOARD_SIDE: u8 = 6;

/// Storage capacity of a board (largest side squared).
pub const MAX_CELLS: usize = (MAX_BOARD_SIDE as usize) * (MAX_BOARD_SIDE as usize);

/// Number of tiles placed when a session starts.
pub const STARTING_TILES: usize = 2;

/// Largest tile a cell may hold. Two of these never merge, so a merge result
/// always fits in a [`Tile`].
pub const MAX_TILE: Tile = 1 << 30;

/// Value of the common spawn.
pub const SPAWN_LOW_VALUE: Tile = 2;

/// Value of the rare spawn.
pub const SPAWN_HIGH_VALUE: Tile = 4;

/// Probability that a spawned tile is [`SPAWN_HIGH_VALUE`].
pub const SPAWN_FOUR_PROBABILITY: f64 = 0.1;

/// Exponent of the level-0 target tile (2^11 = 2048).
pub const BASE_TARGET_EXPONENT: u32 = 11;

/// Exponent ceiling for the target tile (2^17 = 131072).
pub const MAX_TARGET_EXPONENT: u32 = 17;

/// Levels per target doubling.
pub const LEVELS_PER_TARGET_STEP: u32 = 5;

/// Levels per board side increase.
pub const LEVELS_PER_SIZE_STEP: u32 = 10;

/// Fixed frame interval of the terminal runner in milliseconds (~60 FPS).
pub const TICK_MS: u32 = 16;

/// How long the most recently spawned tile is highlighted.
pub const SPAWN_FLASH_MS: u32 = 150;

/// Directions buffered between frames before further input is dropped.
pub const MOVE_QUEUE_CAPACITY: usize = 8;

/// Target tile for a difficulty level.
///
/// ```
/// use nexus_2048_types::target_tile_for_level;
///
/// assert_eq!(target_tile_for_level(4), 2048);
/// assert_eq!(target_tile_for_level(5), 4096);
/// assert_eq!(target_tile_for_level(1000), 131072);
/// ```
pub fn target_tile_for_level(level: u32) -> Tile {
    let exponent = BASE_TARGET_EXPONENT
        .saturating_add(level / LEVELS_PER_TARGET_STEP)
        .min(MAX_TARGET_EXPONENT);
    1 << exponent
}

/// The four slide directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions in canonical order (used for legal-move masks).
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Parse from string (case-insensitive)
    ///
    /// ```
    /// use nexus_2048_types::Direction;
    ///
    /// assert_eq!(Direction::from_str("up"), Some(Direction::Up));
    /// assert_eq!(Direction::from_str("R"), Some(Direction::Right));
    /// assert_eq!(Direction::from_str("sideways"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Position within [`Direction::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

/// Board side length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardSize {
    Four,
    Five,
    Six,
}

impl BoardSize {
    pub fn side(&self) -> u8 {
        match self {
            BoardSize::Four => 4,
            BoardSize::Five => 5,
            BoardSize::Six => 6,
        }
    }

    pub fn cells(&self) -> usize {
        let side = self.side() as usize;
        side * side
    }

    pub fn from_side(side: u8) -> Option<Self> {
        match side {
            4 => Some(BoardSize::Four),
            5 => Some(BoardSize::Five),
            6 => Some(BoardSize::Six),
            _ => None,
        }
    }

    /// Side length used for a difficulty level.
    pub fn for_level(level: u32) -> Self {
        match level / LEVELS_PER_SIZE_STEP {
            0 => BoardSize::Four,
            1 => BoardSize::Five,
            _ => BoardSize::Six,
        }
    }
}

/// Session lifecycle.
///
/// `Idle -> Playing -> {Won, GameOver}`; a restart goes back to `Idle`.
/// `Won` can still accept moves when the session is configured to keep
/// playing after a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Playing,
    Won,
    GameOver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Playing => "playing",
            Phase::Won => "won",
            Phase::GameOver => "game_over",
        }
    }

    pub fn accepts_moves(&self, keep_playing_after_win: bool) -> bool {
        match self {
            Phase::Playing => true,
            Phase::Won => keep_playing_after_win,
            Phase::Idle | Phase::GameOver => false,
        }
    }
}

/// Game actions that can be applied to a session
///
/// These actions are used by both human input and AI control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Slide every tile toward one edge
    Move(Direction),
    /// Discard the session and start a fresh one
    Restart,
}

impl GameAction {
    /// Parse action from string (for AI protocol)
    ///
    /// ```
    /// use nexus_2048_types::{Direction, GameAction};
    ///
    /// assert_eq!(GameAction::from_str("left"), Some(GameAction::Move(Direction::Left)));
    /// assert_eq!(GameAction::from_str("Restart"), Some(GameAction::Restart));
    /// assert_eq!(GameAction::from_str("hardDrop"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("restart") {
            return Some(GameAction::Restart);
        }
        Direction::from_str(s).map(GameAction::Move)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Move(direction) => direction.as_str(),
            GameAction::Restart => "restart",
        }
    }
}

/// Parameters of one game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub level: u32,
    pub size: BoardSize,
    pub seed: u32,
    pub keep_playing_after_win: bool,
}

impl GameConfig {
    /// Config for a level, with the board side derived from it.
    pub fn for_level(level: u32) -> Self {
        Self {
            level,
            size: BoardSize::for_level(level),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: BoardSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_keep_playing(mut self, keep_playing_after_win: bool) -> Self {
        self.keep_playing_after_win = keep_playing_after_win;
        self
    }

    pub fn target_tile(&self) -> Tile {
        target_tile_for_level(self.level)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            level: 0,
            size: BoardSize::Four,
            seed: 1,
            keep_playing_after_win: true,
        }
    }
}

/// Core-side event emitted after a transition commits.
///
/// Observers (sound, notifications, record keeping, adapters) consume these
/// instead of being called from inside the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreEvent {
    /// A move changed the board.
    Moved {
        direction: Direction,
        score_delta: u64,
        merges: u8,
    },
    /// A tile was placed at a row-major cell index.
    Spawned { index: u8, value: Tile },
    /// The target tile was reached for the first time this session.
    Won { tile: Tile, move_count: u32 },
    /// No legal move remains.
    GameOver { score: u64, highest_tile: Tile },
    /// The previous session was discarded. Carries its final score and
    /// highest tile, which nothing else reports for an unfinished game.
    Restarted {
        episode_id: u32,
        previous_score: u64,
        previous_highest_tile: Tile,
    },
}
