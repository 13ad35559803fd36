//! Spawn scheduling and bubble generation
//!
//! The scheduler is a fixed-rate timer on the logical clock. It is cancelled
//! and re-armed (never stacked) on pause, resume and level changes.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::config::{ArenaConfig, GameRules, LevelRules};
use super::state::{Bubble, US_PER_MS};

/// Fixed-rate spawn timer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnScheduler {
    interval_us: u64,
    accumulated_us: u64,
    armed: bool,
}

impl SpawnScheduler {
    /// Cancel any running timer and start a fresh one
    pub fn arm(&mut self, interval_ms: u64) {
        self.interval_us = interval_ms.max(1) * US_PER_MS;
        self.accumulated_us = 0;
        self.armed = true;
    }

    pub fn cancel(&mut self) {
        self.armed = false;
        self.accumulated_us = 0;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_us / US_PER_MS
    }

    /// Advance the timer, returning how many spawns fell due
    pub fn advance(&mut self, dt_us: u64) -> u32 {
        if !self.armed {
            return 0;
        }
        self.accumulated_us += dt_us;
        let due = self.accumulated_us / self.interval_us;
        self.accumulated_us %= self.interval_us;
        due as u32
    }
}

/// Cumulative-probability draw over a level's active types.
///
/// `roll` is uniform in [0, 1). Returns a bubble type index; falls back to the
/// level's first active type if rounding leaves the roll unmatched.
pub fn pick_type(level: &LevelRules, roll: f32) -> usize {
    let mut cumulative = 0.0;
    for &(idx, probability) in &level.weights {
        cumulative += probability;
        if roll <= cumulative {
            return idx;
        }
    }
    level.weights[0].0
}

/// Uniform value in [min, max); tolerates min == max
fn random_between(rng: &mut Pcg32, (min, max): (f32, f32)) -> f32 {
    min + rng.random::<f32>() * (max - min)
}

/// Create a bubble for `level` just below the bottom edge of the arena
pub fn spawn_bubble(
    rules: &GameRules,
    level: &LevelRules,
    arena: ArenaConfig,
    rng: &mut Pcg32,
    id: u32,
    now_ms: u64,
) -> Bubble {
    let ty = rules.bubble_type(pick_type(level, rng.random::<f32>()));

    let radius = random_between(rng, ty.radius_range);
    let speed = random_between(rng, ty.speed_range) * level.speed_multiplier;
    // Inset by radius; narrow arenas center the bubble
    let x = if arena.width > radius * 2.0 {
        random_between(rng, (radius, arena.width - radius))
    } else {
        arena.width / 2.0
    };

    Bubble {
        id,
        kind: ty.name.clone(),
        color: ty.color.clone(),
        pos: Vec2::new(x, arena.height + radius),
        radius,
        speed,
        points: ty.base_points,
        effect: ty.effect,
        spawned_at_ms: now_ms,
    }
}
