//! Local best-score records.
//!
//! A small JSON file holding the best score, best tile and number of finished
//! games. Without a path the records live in memory for the session only.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::SessionObserver;
use crate::types::{CoreEvent, Tile};

/// Records loading/saving error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordsError {
    #[error("failed to access records file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse records file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Records {
    #[serde(default)]
    pub best_score: u64,
    #[serde(default)]
    pub best_tile: Tile,
    #[serde(default)]
    pub games_played: u32,
}

impl Records {
    /// Load from `path`; a missing file yields empty records.
    pub fn load(path: &Path) -> Result<Self, RecordsError> {
        match fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to `path`, replacing it atomically.
    pub fn save(&self, path: &Path) -> Result<(), RecordsError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Fold in a score without counting a finished game. Returns true on a
    /// new best score.
    pub fn observe(&mut self, score: u64, tile: Tile) -> bool {
        self.best_tile = self.best_tile.max(tile);
        if score > self.best_score {
            self.best_score = score;
            true
        } else {
            false
        }
    }

    /// Count a finished game. Returns true on a new best score.
    pub fn record_game(&mut self, score: u64, tile: Tile) -> bool {
        self.games_played = self.games_played.saturating_add(1);
        self.observe(score, tile)
    }
}

/// Session observer that keeps [`Records`] current and persists them when a
/// game ends.
#[derive(Debug, Default)]
pub struct RecordKeeper {
    records: Records,
    path: Option<PathBuf>,
    dirty: bool,
}

impl RecordKeeper {
    /// Load records from `path`. An unreadable file is logged and replaced
    /// with empty records rather than aborting the game.
    pub fn open(path: Option<PathBuf>) -> Self {
        let records = match path.as_deref().map(Records::load) {
            Some(Ok(records)) => {
                info!(best_score = records.best_score, "records loaded");
                records
            }
            Some(Err(e)) => {
                warn!(error = %e, "records unreadable, starting fresh");
                Records::default()
            }
            None => Records::default(),
        };
        Self {
            records,
            path,
            dirty: false,
        }
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn best_score(&self) -> u64 {
        self.records.best_score
    }

    /// Track a session still in progress (called on exit).
    pub fn observe(&mut self, score: u64, tile: Tile) {
        let before = self.records;
        self.records.observe(score, tile);
        self.dirty |= self.records != before;
    }

    /// Persist if anything changed since the last save.
    pub fn flush(&mut self) -> Result<(), RecordsError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }
        self.records.save(path)?;
        self.dirty = false;
        debug!(path = %path.display(), "records saved");
        Ok(())
    }
}

impl SessionObserver for RecordKeeper {
    fn on_event(&mut self, event: &CoreEvent) {
        match *event {
            CoreEvent::Won { tile, move_count } => {
                info!(tile, move_count, "target reached");
                self.observe(0, tile);
            }
            CoreEvent::GameOver {
                score,
                highest_tile,
            } => {
                let best = self.records.record_game(score, highest_tile);
                self.dirty = true;
                info!(score, highest_tile, new_best = best, "game over");
                if let Err(e) = self.flush() {
                    warn!(error = %e, "failed to save records");
                }
            }
            CoreEvent::Restarted {
                previous_score,
                previous_highest_tile,
                ..
            } => {
                self.observe(previous_score, previous_highest_tile);
                if let Err(e) = self.flush() {
                    warn!(error = %e, "failed to save records");
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_game_tracks_bests() {
        let mut r = Records::default();
        assert!(r.record_game(100, 64));
        assert!(!r.record_game(50, 128));
        assert_eq!(
            r,
            Records {
                best_score: 100,
                best_tile: 128,
                games_played: 2,
            }
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let r: Records = serde_json::from_str(r#"{"best_score":12}"#).unwrap();
        assert_eq!(r.best_score, 12);
        assert_eq!(r.games_played, 0);
    }

    #[test]
    fn test_in_memory_keeper_counts_games() {
        let mut keeper = RecordKeeper::open(None);
        keeper.on_event(&CoreEvent::GameOver {
            score: 300,
            highest_tile: 32,
        });
        assert_eq!(keeper.best_score(), 300);
        assert_eq!(keeper.records().games_played, 1);
        assert!(keeper.flush().is_ok());
    }

    #[test]
    fn test_restart_keeps_unfinished_score() {
        let mut keeper = RecordKeeper::open(None);
        keeper.on_event(&CoreEvent::Restarted {
            episode_id: 1,
            previous_score: 2048,
            previous_highest_tile: 256,
        });
        assert_eq!(keeper.best_score(), 2048);
        assert_eq!(keeper.records().best_tile, 256);
        assert_eq!(keeper.records().games_played, 0);
    }
}
