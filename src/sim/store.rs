//! Best-score store boundary
//!
//! The engine reads a player's best at session start and writes it back at
//! session end when beaten. Backends implement `BestScoreStore`.

use std::collections::HashMap;
use std::fmt;

/// Best-score storage failure (never fatal to a session)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backing storage cannot be reached
    Unavailable,
    Io(String),
    Parse(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "best score storage unavailable"),
            Self::Io(msg) => write!(f, "best score storage I/O error: {msg}"),
            Self::Parse(msg) => write!(f, "best score data is corrupt: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// External best-score boundary keyed by player identity
pub trait BestScoreStore {
    /// `Ok(None)` when the player has no recorded best
    fn read_best_score(&mut self, player_id: &str) -> Result<Option<i64>, StoreError>;

    fn write_best_score(&mut self, player_id: &str, score: i64) -> Result<(), StoreError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryBestScores {
    scores: HashMap<String, i64>,
    writes: u32,
}

impl MemoryBestScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one player's best
    pub fn with_score(player_id: &str, score: i64) -> Self {
        let mut store = Self::new();
        store.scores.insert(player_id.to_string(), score);
        store
    }

    pub fn get(&self, player_id: &str) -> Option<i64> {
        self.scores.get(player_id).copied()
    }

    /// Number of successful writes
    pub fn write_count(&self) -> u32 {
        self.writes
    }
}

impl BestScoreStore for MemoryBestScores {
    fn read_best_score(&mut self, player_id: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.get(player_id))
    }

    fn write_best_score(&mut self, player_id: &str, score: i64) -> Result<(), StoreError> {
        self.scores.insert(player_id.to_string(), score);
        self.writes += 1;
        Ok(())
    }
}
