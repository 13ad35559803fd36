//! Events emitted by the engine for presentation

use serde::{Deserialize, Serialize};

use super::state::{Bubble, PowerUpKind};

/// Why a combo ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComboLossReason {
    /// No pop within the combo window
    Timeout,
    /// A combo-resetting bubble was popped
    Reset,
}

/// End-of-session summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalStats {
    pub score: i64,
    pub bubbles_popped: u32,
    pub bubbles_missed: u32,
    /// hits / total * 100, 0 when nothing resolved
    pub accuracy: f64,
    pub final_combo: f32,
    pub best_streak: u32,
    pub level_reached: u32,
    pub previous_best: Option<i64>,
    pub new_high_score: bool,
}

impl FinalStats {
    /// Text offered by the share button
    pub fn share_text(&self) -> String {
        format!(
            "I scored {} points in Click n' Pop! Can you beat my score?",
            self.score
        )
    }
}

/// Engine -> presentation event stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    GameStarted,
    GamePaused,
    GameResumed,
    Spawned {
        bubble: Bubble,
    },
    /// `bubble` carries the last known position
    #[serde(rename_all = "camelCase")]
    Popped {
        bubble: Bubble,
        points_awarded: i64,
        score: i64,
        combo_multiplier: f32,
    },
    Missed {
        bubble: Bubble,
    },
    #[serde(rename_all = "camelCase")]
    LevelChanged {
        level: u32,
        spawn_interval_ms: u64,
    },
    ComboLost {
        reason: ComboLossReason,
    },
    ComboBoosted {
        multiplier: f32,
    },
    #[serde(rename_all = "camelCase")]
    TimeAdded {
        added_ms: u64,
        time_left_ms: i64,
    },
    #[serde(rename_all = "camelCase")]
    PowerUpActivated {
        kind: PowerUpKind,
        expires_in_ms: u64,
    },
    PowerUpExpired {
        kind: PowerUpKind,
    },
    GameEnded {
        stats: FinalStats,
    },
    /// Session torn down; `bubble_ids` were still on screen
    #[serde(rename_all = "camelCase")]
    ArenaCleared {
        bubble_ids: Vec<u32>,
    },
}

/// Receiver of engine events (the presentation boundary)
///
/// The engine pushes every event as it happens; sinks never poll.
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

/// Recording sink, drained by hosts that batch events
impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: GameEvent) {
        (**self).emit(event);
    }
}
