//! Best score persistence
//!
//! The engine reads a player's best score at session start and writes it back
//! at session end when beaten. The `BestScoreStore` boundary itself lives in
//! `sim::store`; this module holds the concrete backends: LocalStorage on
//! the web and a JSON file natively.

use std::collections::BTreeMap;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use crate::sim::store::{BestScoreStore, MemoryBestScores, StoreError};

/// On-disk/in-storage form: player id -> best score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestScores {
    pub entries: BTreeMap<String, i64>,
}

impl BestScores {
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError::Parse(e.to_string()))
    }
}

/// JSON file store for native hosts
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileBestScores {
    path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileBestScores {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BestScores, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => BestScores::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BestScores::default()),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl BestScoreStore for FileBestScores {
    fn read_best_score(&mut self, player_id: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.load()?.entries.get(player_id).copied())
    }

    fn write_best_score(&mut self, player_id: &str, score: i64) -> Result<(), StoreError> {
        let mut scores = self.load()?;
        scores.entries.insert(player_id.to_string(), score);
        std::fs::write(&self.path, scores.to_json()?).map_err(|e| StoreError::Io(e.to_string()))?;
        log::info!("Best score saved for {} ({})", player_id, score);
        Ok(())
    }
}

/// LocalStorage store for the browser
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageBestScores;

#[cfg(target_arch = "wasm32")]
impl LocalStorageBestScores {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "clicknpop_best_scores";

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable)
    }

    fn load(storage: &web_sys::Storage) -> Result<BestScores, StoreError> {
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => BestScores::from_json(&json),
            Ok(None) => Ok(BestScores::default()),
            Err(_) => Err(StoreError::Io("getItem failed".to_string())),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl BestScoreStore for LocalStorageBestScores {
    fn read_best_score(&mut self, player_id: &str) -> Result<Option<i64>, StoreError> {
        let storage = Self::storage()?;
        Ok(Self::load(&storage)?.entries.get(player_id).copied())
    }

    fn write_best_score(&mut self, player_id: &str, score: i64) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        let mut scores = Self::load(&storage)?;
        scores.entries.insert(player_id.to_string(), score);
        storage
            .set_item(Self::STORAGE_KEY, &scores.to_json()?)
            .map_err(|_| StoreError::Io("setItem failed".to_string()))?;
        log::info!("Best score saved ({})", score);
        Ok(())
    }
}
