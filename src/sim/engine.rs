//! Session engine
//!
//! Owns the session state machine (`Idle -> Running <-> Paused -> Ended`),
//! the spawn scheduler and the frame update. Everything is driven by the
//! host calling `tick(dt)` and `pop(id)` from one event loop; wall-clock
//! timers are replaced by the logical clock advanced in `tick`.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::config::{ArenaConfig, EngineConfig, GameRules};
use super::effect::{EffectOutcome, apply_effect};
use super::error::{ConfigError, TransitionError};
use super::event::{ComboLossReason, EventSink, FinalStats, GameEvent};
use super::spawn::{SpawnScheduler, spawn_bubble};
use super::state::{Bubble, Phase, PowerUpKind, SessionState, US_PER_MS};
use super::store::BestScoreStore;

/// Player id used when the host does not supply one
pub const GUEST_PLAYER: &str = "guest";

/// Result of a successful pop
#[derive(Debug, Clone, PartialEq)]
pub struct PopOutcome {
    pub bubble: Bubble,
    pub points_awarded: i64,
    pub score: i64,
}

/// Round half up, matching how the browser rounds awarded points
fn round_points(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// The game session engine
pub struct SessionEngine<S: EventSink, B: BestScoreStore> {
    rules: GameRules,
    arena: ArenaConfig,
    state: SessionState,
    rng: Pcg32,
    spawner: SpawnScheduler,
    player_id: String,
    previous_best: Option<i64>,
    final_stats: Option<FinalStats>,
    sink: S,
    store: B,
}

impl<S: EventSink, B: BestScoreStore> SessionEngine<S, B> {
    /// Validate `config` and build an idle engine
    pub fn new(config: EngineConfig, sink: S, store: B) -> Result<Self, ConfigError> {
        let rules = config.validate()?;
        Ok(Self {
            arena: rules.arena,
            state: SessionState::new(rules.session_duration_ms),
            rules,
            rng: Pcg32::seed_from_u64(0),
            spawner: SpawnScheduler::default(),
            player_id: GUEST_PLAYER.to_string(),
            previous_best: None,
            final_stats: None,
            sink,
            store,
        })
    }

    /// Reseed the bubble generator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg32::seed_from_u64(seed);
        self
    }

    pub fn with_player(mut self, player_id: impl Into<String>) -> Self {
        self.player_id = player_id.into();
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn arena(&self) -> ArenaConfig {
        self.arena
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Best score read at the start of the current session
    pub fn previous_best(&self) -> Option<i64> {
        self.previous_best
    }

    /// Stats of the session that just ended
    pub fn final_stats(&self) -> Option<&FinalStats> {
        self.final_stats.as_ref()
    }

    pub fn spawner(&self) -> &SpawnScheduler {
        &self.spawner
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut B {
        &mut self.store
    }

    /// Start a session from `Idle`
    pub fn start(&mut self) -> Result<(), TransitionError> {
        if self.state.phase != Phase::Idle {
            return Err(TransitionError {
                operation: "start",
                phase: self.state.phase,
            });
        }
        self.begin();
        Ok(())
    }

    fn begin(&mut self) {
        self.state = SessionState::new(self.rules.session_duration_ms);
        self.final_stats = None;
        self.previous_best = match self.store.read_best_score(&self.player_id) {
            Ok(best) => best,
            Err(e) => {
                log::warn!("Could not read best score, assuming none: {}", e);
                None
            }
        };

        self.state.phase = Phase::Running;
        let interval = self.rules.levels.get(1).spawn_interval_ms;
        self.spawner.arm(interval);

        log::info!(
            "Session started for {} (best: {:?}, spawn every {}ms)",
            self.player_id,
            self.previous_best,
            interval
        );
        self.sink.emit(GameEvent::GameStarted);
    }

    /// Suspend spawning and motion; ignored unless `Running`
    pub fn pause(&mut self) -> bool {
        if self.state.phase != Phase::Running {
            log::debug!("pause ignored while {:?}", self.state.phase);
            return false;
        }
        self.state.phase = Phase::Paused;
        self.spawner.cancel();
        self.sink.emit(GameEvent::GamePaused);
        true
    }

    /// Continue a paused session; ignored unless `Paused`
    pub fn resume(&mut self) -> bool {
        if self.state.phase != Phase::Paused {
            log::debug!("resume ignored while {:?}", self.state.phase);
            return false;
        }
        self.state.phase = Phase::Running;
        self.spawner.arm(self.rules.levels.get(self.state.level).spawn_interval_ms);
        self.sink.emit(GameEvent::GameResumed);
        true
    }

    /// Pause when running, resume when paused
    pub fn toggle_pause(&mut self) -> bool {
        match self.state.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Pop a bubble by id.
    ///
    /// Returns `None` outside `Running` or when the bubble is already gone
    /// (e.g. it escaped during the same frame).
    pub fn pop(&mut self, bubble_id: u32) -> Option<PopOutcome> {
        if self.state.phase != Phase::Running {
            log::debug!("pop({}) ignored while {:?}", bubble_id, self.state.phase);
            return None;
        }
        let Some(bubble) = self.state.take_bubble(bubble_id) else {
            log::debug!("pop({}) ignored: no such bubble", bubble_id);
            return None;
        };

        self.state.accuracy.record_hit();
        self.state.bubbles_popped += 1;
        self.state.combo.register_hit(&self.rules.combo, self.state.elapsed_us);

        let combo_multiplier = self.state.combo.multiplier;
        let mut factor = combo_multiplier as f64;
        if self.state.power_up_active(PowerUpKind::Multiplier) {
            factor *= self.rules.power_ups.points_factor as f64;
        }
        let points_awarded = round_points(bubble.points as f64 * factor);
        self.state.score += points_awarded;

        let outcome = apply_effect(bubble.effect, &mut self.state, &self.rules.effects);

        self.sink.emit(GameEvent::Popped {
            bubble: bubble.clone(),
            points_awarded,
            score: self.state.score,
            combo_multiplier,
        });
        match outcome {
            Some(EffectOutcome::TimeAdded { added_ms, time_left_ms }) => {
                self.sink.emit(GameEvent::TimeAdded { added_ms, time_left_ms });
            }
            Some(EffectOutcome::ComboBoosted { multiplier }) => {
                self.sink.emit(GameEvent::ComboBoosted { multiplier });
            }
            Some(EffectOutcome::ComboReset) => {
                self.sink.emit(GameEvent::ComboLost {
                    reason: ComboLossReason::Reset,
                });
            }
            None => {}
        }

        Some(PopOutcome {
            bubble,
            points_awarded,
            score: self.state.score,
        })
    }

    /// Activate a timed power-up; re-activating extends it from now
    pub fn activate_power_up(&mut self, kind: PowerUpKind) -> bool {
        if self.state.phase != Phase::Running {
            log::debug!("power-up {:?} ignored while {:?}", kind, self.state.phase);
            return false;
        }
        let duration_ms = self.rules.power_ups.duration_ms(kind);
        let expiry = self.state.elapsed_us + duration_ms * US_PER_MS;
        self.state.active_power_ups.insert(kind, expiry);
        self.sink.emit(GameEvent::PowerUpActivated {
            kind,
            expires_in_ms: duration_ms,
        });
        true
    }

    /// New arena size for subsequent spawns
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            log::debug!("resize to {}x{} ignored", width, height);
            return false;
        }
        self.arena = ArenaConfig { width, height };
        true
    }

    /// Advance the session by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        // Stale frame callbacks after pause/end land here
        if self.state.phase != Phase::Running {
            return;
        }
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }
        // Float-to-int `as` saturates, so huge steps land on u64::MAX
        let requested_us = (dt as f64 * 1_000_000.0).round() as u64;

        // A step never runs past the end of the session. While frozen the
        // countdown does not move, so the step stops at the freeze expiry.
        let frozen_until = self
            .state
            .active_power_ups
            .get(&PowerUpKind::TimeFreeze)
            .copied()
            .filter(|_| self.state.power_up_active(PowerUpKind::TimeFreeze));
        let limit_us = match frozen_until {
            Some(expiry) => expiry - self.state.elapsed_us,
            None => self.state.time_left_us.max(0) as u64,
        };
        let dt_us = requested_us.min(limit_us);
        let dt = dt_us as f32 / 1_000_000.0;

        // Clock and countdown
        self.state.elapsed_us += dt_us;
        if frozen_until.is_none() {
            self.state.time_left_us -= dt_us as i64;
        }
        let now_us = self.state.elapsed_us;

        // Power-up expiry
        let expired: Vec<PowerUpKind> = self
            .state
            .active_power_ups
            .iter()
            .filter(|&(_, &expiry)| expiry <= now_us)
            .map(|(&kind, _)| kind)
            .collect();
        for kind in expired {
            self.state.active_power_ups.remove(&kind);
            self.sink.emit(GameEvent::PowerUpExpired { kind });
        }

        // Combo window
        if self.state.combo.is_expired(now_us) {
            self.state.combo.reset();
            self.sink.emit(GameEvent::ComboLost {
                reason: ComboLossReason::Timeout,
            });
        }

        // Bubble motion; a miss does not break the combo
        let speed_factor = if self.state.power_up_active(PowerUpKind::Magnet) {
            self.rules.power_ups.magnet_speed_factor
        } else {
            1.0
        };
        for bubble in &mut self.state.bubbles {
            bubble.advance(dt, speed_factor);
        }
        let (escaped, live): (Vec<Bubble>, Vec<Bubble>) = std::mem::take(&mut self.state.bubbles)
            .into_iter()
            .partition(|b| b.has_escaped());
        self.state.bubbles = live;
        for bubble in escaped {
            self.state.accuracy.record_miss();
            self.state.bubbles_missed += 1;
            self.sink.emit(GameEvent::Missed { bubble });
        }

        // Spawning at the current level's rate
        let due = self.spawner.advance(dt_us);
        for _ in 0..due {
            self.spawn();
        }

        // Level is derived from elapsed time; crossing several thresholds
        // reports each level in turn
        let new_level = self.rules.levels.level_for_elapsed(self.state.elapsed_ms());
        if new_level != self.state.level {
            let from = self.state.level;
            for level in (from + 1)..=new_level {
                self.sink.emit(GameEvent::LevelChanged {
                    level,
                    spawn_interval_ms: self.rules.levels.get(level).spawn_interval_ms,
                });
            }
            self.state.level = new_level;
            let interval = self.rules.levels.get(new_level).spawn_interval_ms;
            self.spawner.arm(interval);
            log::info!("Level {} -> {} (spawn every {}ms)", from, new_level, interval);
        }

        if self.state.time_left_us <= 0 {
            self.finish();
        }
    }

    fn spawn(&mut self) {
        let id = self.state.next_bubble_id();
        let level = self.rules.levels.get(self.state.level);
        let bubble = spawn_bubble(
            &self.rules,
            level,
            self.arena,
            &mut self.rng,
            id,
            self.state.elapsed_ms(),
        );
        self.state.bubbles.push(bubble.clone());
        self.sink.emit(GameEvent::Spawned { bubble });
    }

    /// End the session early (from `Running` or `Paused`)
    pub fn end(&mut self) -> Result<FinalStats, TransitionError> {
        if !self.state.is_playing() {
            return Err(TransitionError {
                operation: "end",
                phase: self.state.phase,
            });
        }
        Ok(self.finish())
    }

    fn finish(&mut self) -> FinalStats {
        self.spawner.cancel();
        self.state.combo.expires_at_us = None;
        self.state.active_power_ups.clear();

        let score = self.state.score;
        let new_high_score = match self.previous_best {
            Some(best) => score > best,
            None => score > 0,
        };
        if new_high_score {
            if let Err(e) = self.store.write_best_score(&self.player_id, score) {
                log::warn!("Could not save best score {}: {}", score, e);
            }
        }

        let stats = FinalStats {
            score,
            bubbles_popped: self.state.bubbles_popped,
            bubbles_missed: self.state.bubbles_missed,
            accuracy: self.state.accuracy.percent(),
            final_combo: self.state.combo.multiplier,
            best_streak: self.state.combo.best_streak,
            level_reached: self.state.level,
            previous_best: self.previous_best,
            new_high_score,
        };
        self.state.phase = Phase::Ended;
        self.final_stats = Some(stats.clone());

        log::info!(
            "Session ended: score {} accuracy {:.1}% (new high score: {})",
            stats.score,
            stats.accuracy,
            new_high_score
        );
        self.sink.emit(GameEvent::GameEnded { stats: stats.clone() });
        stats
    }

    /// Drop the current session (any phase) and start a fresh one
    pub fn restart(&mut self) {
        self.reset();
        self.begin();
    }

    /// Tear down to `Idle` without recording a result
    pub fn reset(&mut self) {
        self.spawner.cancel();
        let previous = std::mem::replace(&mut self.state, SessionState::new(self.rules.session_duration_ms));
        self.final_stats = None;
        if previous.phase != Phase::Idle {
            self.sink.emit(GameEvent::ArenaCleared {
                bubble_ids: previous.bubbles.iter().map(|b| b.id).collect(),
            });
        }
    }
}
