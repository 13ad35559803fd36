//! Session state and core simulation types
//!
//! Everything a single play session mutates lives in `SessionState`.
//! Times are kept on a logical clock in microseconds so that coarse and fine
//! tick granularity reach the same thresholds.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::config::{ComboConfig, Effect};

/// Microseconds per millisecond
pub const US_PER_MS: u64 = 1_000;

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// No timers active, arena empty
    #[default]
    Idle,
    /// Spawning and moving bubbles
    Running,
    /// Loops suspended, bubbles frozen
    Paused,
    /// Session over; only restart is accepted
    Ended,
}

/// Timed power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerUpKind {
    /// Countdown halts
    TimeFreeze,
    /// Awarded points are scaled up
    Multiplier,
    /// Bubbles rise slower
    Magnet,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [Self::TimeFreeze, Self::Multiplier, Self::Magnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::TimeFreeze => "timefreeze",
            PowerUpKind::Multiplier => "multiplier",
            PowerUpKind::Magnet => "magnet",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "timefreeze" | "time_freeze" => Some(PowerUpKind::TimeFreeze),
            "multiplier" => Some(PowerUpKind::Multiplier),
            "magnet" => Some(PowerUpKind::Magnet),
            _ => None,
        }
    }
}

/// A live bubble, owned by the engine until popped or missed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub id: u32,
    /// Bubble type name
    pub kind: String,
    pub color: String,
    /// Center position; y decreases as the bubble rises
    pub pos: Vec2,
    pub radius: f32,
    /// Rise speed in pixels per second, level multiplier applied
    pub speed: f32,
    pub points: i32,
    pub effect: Effect,
    /// Session clock (ms) at spawn
    pub spawned_at_ms: u64,
}

impl Bubble {
    /// Move upward by `speed * dt`
    pub fn advance(&mut self, dt: f32, speed_factor: f32) {
        self.pos.y -= self.speed * speed_factor * dt;
    }

    /// True once the whole bubble has left through the top edge
    pub fn has_escaped(&self) -> bool {
        self.pos.y + self.radius < 0.0
    }
}

/// Hits versus resolved bubbles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Accuracy {
    pub hits: u32,
    pub total: u32,
}

impl Accuracy {
    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.total += 1;
    }

    pub fn record_miss(&mut self) {
        self.total += 1;
    }

    /// Percentage of resolved bubbles that were popped (0 when none resolved)
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.hits as f64 / self.total as f64 * 100.0
        }
    }
}

/// Streak-based score multiplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub streak: u32,
    pub multiplier: f32,
    /// Longest streak this session
    pub best_streak: u32,
    /// Clock (us) at which the combo is lost if no pop happens first
    pub expires_at_us: Option<u64>,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            streak: 0,
            multiplier: 1.0,
            best_streak: 0,
            expires_at_us: None,
        }
    }
}

impl ComboState {
    /// Extend the streak and re-arm the expiry window.
    ///
    /// The multiplier never drops here: a boosted multiplier survives until
    /// the streak earns a larger step or the combo breaks.
    pub fn register_hit(&mut self, config: &ComboConfig, now_us: u64) {
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        self.multiplier = self.multiplier.max(config.multiplier_for(self.streak));
        self.expires_at_us = Some(now_us + config.window_ms * US_PER_MS);
    }

    /// Back to base values; the timer is disarmed
    pub fn reset(&mut self) {
        self.streak = 0;
        self.multiplier = 1.0;
        self.expires_at_us = None;
    }

    pub fn is_expired(&self, now_us: u64) -> bool {
        self.expires_at_us.is_some_and(|at| now_us >= at)
    }
}

/// Complete state of one play session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    /// May go negative after bomb pops
    pub score: i64,
    pub time_left_us: i64,
    /// Logical clock: running time since start, paused time excluded
    pub elapsed_us: u64,
    /// 1-based level
    pub level: u32,
    pub combo: ComboState,
    pub accuracy: Accuracy,
    pub bubbles_popped: u32,
    pub bubbles_missed: u32,
    /// Live bubbles (sorted by id)
    pub bubbles: Vec<Bubble>,
    /// Power-up kind -> expiry on the logical clock (us)
    pub active_power_ups: BTreeMap<PowerUpKind, u64>,
    next_id: u32,
}

impl SessionState {
    /// Fresh idle state for a session of `duration_ms`
    pub fn new(duration_ms: u64) -> Self {
        Self {
            phase: Phase::Idle,
            score: 0,
            time_left_us: (duration_ms * US_PER_MS) as i64,
            elapsed_us: 0,
            level: 1,
            combo: ComboState::default(),
            accuracy: Accuracy::default(),
            bubbles_popped: 0,
            bubbles_missed: 0,
            bubbles: Vec::new(),
            active_power_ups: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Allocate a new bubble ID (unique per session)
    pub fn next_bubble_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.phase, Phase::Running | Phase::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn time_left_ms(&self) -> i64 {
        self.time_left_us.div_euclid(US_PER_MS as i64)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_us / US_PER_MS
    }

    pub fn power_up_active(&self, kind: PowerUpKind) -> bool {
        self.active_power_ups
            .get(&kind)
            .is_some_and(|&expiry| self.elapsed_us < expiry)
    }

    pub fn bubble(&self, id: u32) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    /// Remove and return a bubble by id
    pub fn take_bubble(&mut self, id: u32) -> Option<Bubble> {
        let idx = self.bubbles.iter().position(|b| b.id == id)?;
        Some(self.bubbles.remove(idx))
    }
}
