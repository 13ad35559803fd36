//! Click n' Pop - a bubble-popping arcade game
//!
//! Core modules:
//! - `sim`: Deterministic session engine (spawning, scoring, combos, levels)
//! - `presentation`: Engine events -> render commands for the host page
//! - `highscores`: Best-score backends (file, LocalStorage)
//! - `settings`: Host preferences
//! - `web`: wasm-bindgen host wrapper (wasm32 only)

pub mod highscores;
pub mod presentation;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use presentation::Presenter;
pub use settings::Settings;
pub use sim::{BestScoreStore, EngineConfig, GameEvent, MemoryBestScores, SessionEngine, StoreError};

/// Game configuration constants
pub mod consts {
    /// Fixed host timestep (60 Hz, matches display refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Reference arena dimensions (pixels)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;
}
