//! Game state module - the session controller
//!
//! Owns the board, score and lifecycle of one game and sequences every move
//! as slide → commit → spawn → terminal checks → events. Transitions never
//! call out to observers; they queue [`CoreEvent`]s that callers drain once
//! the transition has fully committed.

use arrayvec::ArrayVec;
use rand::RngCore;

use crate::board::Board;
use crate::rng::SimpleRng;
use crate::rules::check_terminal;
use crate::slide::resolve_move;
use crate::snapshot::GameSnapshot;
use crate::spawn::{spawn_tile, SpawnedTile};
use crate::types::{
    CoreEvent, Direction, GameAction, GameConfig, Phase, Tile, STARTING_TILES,
};

/// Pending events kept between drains; the oldest is dropped past this.
pub const MAX_PENDING_EVENTS: usize = 16;

/// Receives committed transitions.
pub trait SessionObserver {
    fn on_event(&mut self, event: &CoreEvent);
}

impl<F: FnMut(&CoreEvent)> SessionObserver for F {
    fn on_event(&mut self, event: &CoreEvent) {
        self(event)
    }
}

/// What a call to [`GameState::apply_move`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveResult {
    /// False when the move was ignored or would not change the board.
    pub changed: bool,
    pub score_delta: u64,
    pub merges: u8,
    pub spawned: Option<SpawnedTile>,
    /// The target tile was reached by this move (first time only).
    pub won: bool,
    pub game_over: bool,
}

/// Complete session state.
#[derive(Debug, Clone)]
pub struct GameState<R: RngCore = SimpleRng> {
    config: GameConfig,
    board: Board,
    previous_board: Option<Board>,
    rng: R,
    phase: Phase,
    score: u64,
    highest_tile: Tile,
    move_count: u32,
    won: bool,
    won_at_move: Option<u32>,
    episode_id: u32,
    last_spawn: Option<SpawnedTile>,
    events: ArrayVec<CoreEvent, MAX_PENDING_EVENTS>,
}

impl GameState<SimpleRng> {
    /// Create an idle session seeded from `config.seed`.
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, SimpleRng::new(config.seed))
    }
}

impl Default for GameState<SimpleRng> {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl<R: RngCore> GameState<R> {
    /// Create an idle session drawing spawns from `rng`.
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        Self {
            config,
            board: Board::new(config.size),
            previous_board: None,
            rng,
            phase: Phase::Idle,
            score: 0,
            highest_tile: 0,
            move_count: 0,
            won: false,
            won_at_move: None,
            episode_id: 0,
            last_spawn: None,
            events: ArrayVec::new(),
        }
    }

    /// Resume play from a prepared board.
    ///
    /// The board size overrides `config.size`. A board that already holds the
    /// target starts out `Won`; a board with no legal move starts `GameOver`.
    /// No events are emitted.
    pub fn from_board(config: GameConfig, board: Board, rng: R) -> Self {
        let config = GameConfig {
            size: board.size(),
            ..config
        };
        let mut state = Self::with_rng(config, rng);
        state.board = board;
        state.highest_tile = board.max_tile();
        state.phase = Phase::Playing;

        let check = check_terminal(&board, config.target_tile());
        if check.won {
            state.won = true;
            state.won_at_move = Some(0);
            state.phase = Phase::Won;
        }
        if check.game_over {
            state.phase = Phase::GameOver;
        }
        state
    }

    /// Start the session (`Idle → Playing`) with two spawned tiles.
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::Playing;
        for _ in 0..STARTING_TILES {
            self.spawn();
        }
        self.highest_tile = self.board.max_tile();
    }

    /// Slide toward `direction` and, if anything moved, spawn and check.
    pub fn apply_move(&mut self, direction: Direction) -> MoveResult {
        if !self.phase.accepts_moves(self.config.keep_playing_after_win) {
            return MoveResult::default();
        }

        let outcome = resolve_move(&self.board, direction);
        if !outcome.changed {
            return MoveResult::default();
        }

        self.previous_board = Some(self.board);
        self.board = outcome.board;
        self.score = self.score.saturating_add(outcome.score_delta);
        self.move_count = self.move_count.saturating_add(1);
        self.push_event(CoreEvent::Moved {
            direction,
            score_delta: outcome.score_delta,
            merges: outcome.merges,
        });

        // A changed board always has at least one empty cell.
        debug_assert!(!self.board.is_full(), "changed move left a full board");
        let spawned = self.spawn();
        self.highest_tile = self.highest_tile.max(self.board.max_tile());

        let check = check_terminal(&self.board, self.target_tile());
        let won_now = check.won && !self.won;
        if won_now {
            self.won = true;
            self.won_at_move = Some(self.move_count);
            self.phase = Phase::Won;
            self.push_event(CoreEvent::Won {
                tile: self.highest_tile,
                move_count: self.move_count,
            });
        }
        if check.game_over {
            self.phase = Phase::GameOver;
            self.push_event(CoreEvent::GameOver {
                score: self.score,
                highest_tile: self.highest_tile,
            });
        }

        MoveResult {
            changed: true,
            score_delta: outcome.score_delta,
            merges: outcome.merges,
            spawned,
            won: won_now,
            game_over: check.game_over,
        }
    }

    /// Discard the session and start a fresh one on the same random stream.
    pub fn restart(&mut self) {
        let previous_score = self.score;
        let previous_highest_tile = self.highest_tile;
        self.board = Board::new(self.config.size);
        self.previous_board = None;
        self.phase = Phase::Idle;
        self.score = 0;
        self.highest_tile = 0;
        self.move_count = 0;
        self.won = false;
        self.won_at_move = None;
        self.last_spawn = None;
        self.episode_id = self.episode_id.wrapping_add(1);
        self.push_event(CoreEvent::Restarted {
            episode_id: self.episode_id,
            previous_score,
            previous_highest_tile,
        });
        self.start();
    }

    /// Apply a game action. Returns true if the board changed.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Move(direction) => self.apply_move(direction).changed,
            GameAction::Restart => {
                self.restart();
                true
            }
        }
    }

    fn spawn(&mut self) -> Option<SpawnedTile> {
        let spawned = spawn_tile(&mut self.board, &mut self.rng);
        if let Some(tile) = spawned {
            self.last_spawn = Some(tile);
            self.push_event(CoreEvent::Spawned {
                index: tile.index,
                value: tile.value,
            });
        }
        spawned
    }

    fn push_event(&mut self, event: CoreEvent) {
        if self.events.is_full() {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    /// Drain pending events in emission order.
    pub fn take_events(&mut self) -> ArrayVec<CoreEvent, MAX_PENDING_EVENTS> {
        std::mem::take(&mut self.events)
    }

    /// Feed pending events to `observer`, then clear them.
    pub fn dispatch_events<O: SessionObserver + ?Sized>(&mut self, observer: &mut O) {
        for event in self.take_events() {
            observer.on_event(&event);
        }
    }

    pub fn pending_events(&self) -> &[CoreEvent] {
        &self.events
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Board before the last committed move.
    pub fn previous_board(&self) -> Option<&Board> {
        self.previous_board.as_ref()
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn highest_tile(&self) -> Tile {
        self.highest_tile
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn won(&self) -> bool {
        self.won
    }

    pub fn won_at_move(&self) -> Option<u32> {
        self.won_at_move
    }

    pub fn game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn level(&self) -> u32 {
        self.config.level
    }

    pub fn target_tile(&self) -> Tile {
        self.config.target_tile()
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn last_spawn(&self) -> Option<SpawnedTile> {
        self.last_spawn
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.side = self.board.size().side();
        self.board.write_grid(&mut out.cells);
        out.phase = self.phase;
        out.score = self.score;
        out.highest_tile = self.highest_tile;
        out.move_count = self.move_count;
        out.target_tile = self.target_tile();
        out.level = self.config.level;
        out.won = self.won;
        out.won_at_move = self.won_at_move;
        out.keep_playing_after_win = self.config.keep_playing_after_win;
        out.episode_id = self.episode_id;
        out.seed = self.config.seed;
        out.last_spawn = self.last_spawn;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut out = GameSnapshot::default();
        self.snapshot_into(&mut out);
        out
    }
}
