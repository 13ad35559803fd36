//! Deterministic session engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Logical clock driven by `tick(dt)` only
//! - Seeded RNG only
//! - Stable iteration order (by bubble ID)
//! - No rendering or platform dependencies

pub mod config;
pub mod effect;
pub mod engine;
pub mod error;
pub mod event;
pub mod spawn;
pub mod state;
pub mod store;

pub use config::{
    ArenaConfig, BubbleTypeConfig, ComboConfig, ComboStep, Effect, EffectConfig, EngineConfig,
    GameRules, LevelConfig, LevelRules, LevelTable, PowerUpConfig,
};
pub use effect::{EffectOutcome, apply_effect};
pub use engine::{GUEST_PLAYER, PopOutcome, SessionEngine};
pub use error::{ConfigError, RangeField, TransitionError};
pub use event::{ComboLossReason, EventSink, FinalStats, GameEvent};
pub use spawn::{SpawnScheduler, pick_type, spawn_bubble};
pub use state::{Accuracy, Bubble, ComboState, Phase, PowerUpKind, SessionState};
pub use store::{BestScoreStore, MemoryBestScores, StoreError};
