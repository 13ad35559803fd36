//! Data-driven game balance
//!
//! Bubble types, the level table and combo/effect/power-up tuning are all
//! injected at construction time. `EngineConfig` is the raw, serializable
//! form; `GameRules` is what the engine runs on once `validate()` accepts it.

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, RangeField};
use super::state::PowerUpKind;

/// Side effect triggered when a bubble of this type is popped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Effect {
    #[default]
    None,
    /// Extend the session countdown
    AddTime,
    /// Multiply the combo multiplier without touching the streak
    BoostCombo,
    /// Break the combo immediately
    ResetCombo,
}

/// Static description of one bubble type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleTypeConfig {
    pub name: String,
    pub color: String,
    /// Negative for punishing types
    pub base_points: i32,
    pub spawn_probability: f32,
    pub radius_range: (f32, f32),
    /// Rise speed in pixels per second before the level multiplier
    pub speed_range: (f32, f32),
    #[serde(default)]
    pub effect: Effect,
}

/// One row of the level table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    /// Elapsed session time at which this level begins
    pub starts_at_ms: u64,
    pub spawn_interval_ms: u64,
    pub speed_multiplier: f32,
    pub active_types: Vec<String>,
    /// Display name ("Normal", "Fast", ...)
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboStep {
    pub streak: u32,
    pub multiplier: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboConfig {
    /// Ascending streak thresholds
    pub steps: Vec<ComboStep>,
    /// Idle time after a pop before the combo is lost
    pub window_ms: u64,
}

impl ComboConfig {
    /// Multiplier earned by a streak (1.0 below the first step)
    pub fn multiplier_for(&self, streak: u32) -> f32 {
        self.steps
            .iter()
            .rev()
            .find(|step| streak >= step.streak)
            .map(|step| step.multiplier)
            .unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectConfig {
    pub time_bonus_ms: u64,
    pub combo_boost_factor: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerUpConfig {
    pub time_freeze_ms: u64,
    pub multiplier_ms: u64,
    pub magnet_ms: u64,
    /// Point multiplier while `Multiplier` is active
    pub points_factor: f32,
    /// Rise speed factor while `Magnet` is active
    pub magnet_speed_factor: f32,
}

impl PowerUpConfig {
    pub fn duration_ms(&self, kind: PowerUpKind) -> u64 {
        match kind {
            PowerUpKind::TimeFreeze => self.time_freeze_ms,
            PowerUpKind::Multiplier => self.multiplier_ms,
            PowerUpKind::Magnet => self.magnet_ms,
        }
    }
}

/// Playfield size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
}

/// Complete engine configuration as supplied by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub bubble_types: Vec<BubbleTypeConfig>,
    pub levels: Vec<LevelConfig>,
    pub combo: ComboConfig,
    pub effects: EffectConfig,
    pub power_ups: PowerUpConfig,
    pub session_duration_ms: u64,
    pub arena: ArenaConfig,
}

fn bubble_type(
    name: &str,
    color: &str,
    base_points: i32,
    spawn_probability: f32,
    radius_range: (f32, f32),
    speed_range: (f32, f32),
    effect: Effect,
) -> BubbleTypeConfig {
    BubbleTypeConfig {
        name: name.to_string(),
        color: color.to_string(),
        base_points,
        spawn_probability,
        radius_range,
        speed_range,
        effect,
    }
}

fn level(
    starts_at_ms: u64,
    spawn_interval_ms: u64,
    speed_multiplier: f32,
    active_types: &[&str],
    name: &str,
) -> LevelConfig {
    LevelConfig {
        starts_at_ms,
        spawn_interval_ms,
        speed_multiplier,
        active_types: active_types.iter().map(|t| t.to_string()).collect(),
        name: name.to_string(),
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bubble_types: vec![
                bubble_type("normal", "#4a90e2", 10, 0.70, (30.0, 45.0), (40.0, 80.0), Effect::None),
                bubble_type("golden", "#FFD700", 50, 0.10, (25.0, 35.0), (60.0, 100.0), Effect::None),
                bubble_type("time", "#00FF88", 0, 0.08, (35.0, 50.0), (30.0, 60.0), Effect::AddTime),
                bubble_type(
                    "multiplier",
                    "#9C27B0",
                    30,
                    0.07,
                    (30.0, 40.0),
                    (50.0, 90.0),
                    Effect::BoostCombo,
                ),
                bubble_type("bomb", "#FF4444", -20, 0.05, (40.0, 55.0), (20.0, 50.0), Effect::ResetCombo),
            ],
            levels: vec![
                level(0, 800, 1.0, &["normal", "golden"], "Normal"),
                level(12_000, 650, 1.2, &["normal", "golden", "time"], "Fast"),
                level(24_000, 500, 1.4, &["normal", "golden", "time", "multiplier"], "Faster"),
                level(
                    36_000,
                    400,
                    1.6,
                    &["normal", "golden", "time", "multiplier", "bomb"],
                    "Very Fast",
                ),
                level(48_000, 300, 1.8, &["golden", "time", "multiplier", "bomb"], "Extreme"),
            ],
            combo: ComboConfig {
                steps: vec![
                    ComboStep { streak: 10, multiplier: 2.0 },
                    ComboStep { streak: 20, multiplier: 3.0 },
                    ComboStep { streak: 30, multiplier: 4.0 },
                    ComboStep { streak: 40, multiplier: 5.0 },
                ],
                window_ms: 1_500,
            },
            effects: EffectConfig {
                time_bonus_ms: 5_000,
                combo_boost_factor: 2.0,
            },
            power_ups: PowerUpConfig {
                time_freeze_ms: 5_000,
                multiplier_ms: 10_000,
                magnet_ms: 15_000,
                points_factor: 2.0,
                magnet_speed_factor: 0.5,
            },
            session_duration_ms: 60_000,
            arena: ArenaConfig {
                width: crate::consts::ARENA_WIDTH,
                height: crate::consts::ARENA_HEIGHT,
            },
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from camelCase JSON (not yet validated)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Check every table and resolve level type names to indices
    pub fn validate(self) -> Result<GameRules, ConfigError> {
        let arena = self.arena;
        if !(arena.width > 0.0 && arena.height > 0.0 && arena.width.is_finite() && arena.height.is_finite()) {
            return Err(ConfigError::InvalidArena {
                width: arena.width,
                height: arena.height,
            });
        }
        if self.session_duration_ms == 0 {
            return Err(ConfigError::ZeroSessionDuration);
        }

        let boost = self.effects.combo_boost_factor;
        if !(boost >= 1.0 && boost.is_finite()) {
            return Err(ConfigError::InvalidBoostFactor { factor: boost });
        }
        let points = self.power_ups.points_factor;
        if !(points > 0.0 && points.is_finite()) {
            return Err(ConfigError::InvalidPointsFactor { factor: points });
        }
        let magnet = self.power_ups.magnet_speed_factor;
        if !(magnet > 0.0 && magnet <= 1.0) {
            return Err(ConfigError::InvalidMagnetFactor { factor: magnet });
        }

        if self.bubble_types.is_empty() {
            return Err(ConfigError::NoBubbleTypes);
        }
        for (i, ty) in self.bubble_types.iter().enumerate() {
            if self.bubble_types[..i].iter().any(|other| other.name == ty.name) {
                return Err(ConfigError::DuplicateBubbleType { name: ty.name.clone() });
            }
            check_range(&ty.name, RangeField::Radius, ty.radius_range, 0.0)?;
            check_range(&ty.name, RangeField::Speed, ty.speed_range, 0.0)?;
        }

        let mut combo_prev = ComboStep { streak: 0, multiplier: 1.0 };
        for (index, step) in self.combo.steps.iter().enumerate() {
            let increasing = step.streak > combo_prev.streak && step.multiplier > combo_prev.multiplier;
            if !increasing || !step.multiplier.is_finite() {
                return Err(ConfigError::NonMonotoneCombo { index });
            }
            combo_prev = *step;
        }

        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        let mut levels = Vec::with_capacity(self.levels.len());
        for (i, cfg) in self.levels.into_iter().enumerate() {
            let number = i as u32 + 1;
            if i == 0 && cfg.starts_at_ms != 0 {
                return Err(ConfigError::FirstLevelNotAtZero {
                    starts_at_ms: cfg.starts_at_ms,
                });
            }
            let prev_start = levels.last().map(|l: &LevelRules| l.starts_at_ms);
            if prev_start.is_some_and(|prev| cfg.starts_at_ms <= prev) {
                return Err(ConfigError::LevelsOutOfOrder { level: number });
            }
            if cfg.spawn_interval_ms == 0 {
                return Err(ConfigError::InvalidSpawnInterval { level: number });
            }
            if !(cfg.speed_multiplier > 0.0 && cfg.speed_multiplier.is_finite()) {
                return Err(ConfigError::InvalidSpeedMultiplier {
                    level: number,
                    multiplier: cfg.speed_multiplier,
                });
            }
            if cfg.active_types.is_empty() {
                return Err(ConfigError::EmptyActiveTypes { level: number });
            }

            let mut raw = Vec::with_capacity(cfg.active_types.len());
            for name in &cfg.active_types {
                let idx = self
                    .bubble_types
                    .iter()
                    .position(|t| &t.name == name)
                    .ok_or_else(|| ConfigError::UnknownBubbleType {
                        level: number,
                        name: name.clone(),
                    })?;
                raw.push((idx, self.bubble_types[idx].spawn_probability));
            }
            let total: f32 = raw.iter().map(|(_, p)| p).sum();
            let any_negative = raw.iter().any(|(_, p)| *p < 0.0);
            if !(total > 0.0 && total.is_finite()) || any_negative {
                return Err(ConfigError::NonPositiveProbability { level: number, total });
            }

            levels.push(LevelRules {
                number,
                starts_at_ms: cfg.starts_at_ms,
                spawn_interval_ms: cfg.spawn_interval_ms,
                speed_multiplier: cfg.speed_multiplier,
                name: if cfg.name.is_empty() {
                    format!("Level {}", number)
                } else {
                    cfg.name
                },
                weights: raw.into_iter().map(|(idx, p)| (idx, p / total)).collect(),
            });
        }

        Ok(GameRules {
            bubble_types: self.bubble_types,
            levels: LevelTable { levels },
            combo: self.combo,
            effects: self.effects,
            power_ups: self.power_ups,
            session_duration_ms: self.session_duration_ms,
            arena,
        })
    }
}

fn check_range(name: &str, field: RangeField, (min, max): (f32, f32), floor: f32) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min >= floor && min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange {
            name: name.to_string(),
            field,
            min,
            max,
        })
    }
}

/// A validated level with its spawn distribution
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRules {
    /// 1-based level number
    pub number: u32,
    pub starts_at_ms: u64,
    pub spawn_interval_ms: u64,
    pub speed_multiplier: f32,
    pub name: String,
    /// (bubble type index, probability normalized over the active set)
    pub weights: Vec<(usize, f32)>,
}

/// Ordered level table; the level is a pure function of elapsed time
#[derive(Debug, Clone, PartialEq)]
pub struct LevelTable {
    levels: Vec<LevelRules>,
}

impl LevelTable {
    pub fn max_level(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Level in effect after `elapsed_ms` of play, capped at the last level
    pub fn level_for_elapsed(&self, elapsed_ms: u64) -> u32 {
        self.levels
            .iter()
            .filter(|l| l.starts_at_ms <= elapsed_ms)
            .count()
            .max(1) as u32
    }

    /// Rules for a 1-based level number (clamped to the table)
    pub fn get(&self, number: u32) -> &LevelRules {
        let idx = (number.max(1) as usize - 1).min(self.levels.len() - 1);
        &self.levels[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelRules> {
        self.levels.iter()
    }
}

/// Validated configuration the engine runs on
#[derive(Debug, Clone, PartialEq)]
pub struct GameRules {
    pub bubble_types: Vec<BubbleTypeConfig>,
    pub levels: LevelTable,
    pub combo: ComboConfig,
    pub effects: EffectConfig,
    pub power_ups: PowerUpConfig,
    pub session_duration_ms: u64,
    pub arena: ArenaConfig,
}

impl GameRules {
    pub fn bubble_type(&self, index: usize) -> &BubbleTypeConfig {
        &self.bubble_types[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let rules = EngineConfig::default().validate().unwrap();
        assert_eq!(rules.levels.max_level(), 5);
        assert_eq!(rules.levels.get(1).spawn_interval_ms, 800);
        assert_eq!(rules.levels.get(5).name, "Extreme");

        for level in rules.levels.iter() {
            let total: f32 = level.weights.iter().map(|(_, p)| p).sum();
            assert!((total - 1.0).abs() < 1e-5, "level {} sums to {}", level.number, total);
        }
    }

    #[test]
    fn test_level_for_elapsed_thresholds() {
        let rules = EngineConfig::default().validate().unwrap();
        let table = &rules.levels;
        assert_eq!(table.level_for_elapsed(0), 1);
        assert_eq!(table.level_for_elapsed(11_999), 1);
        assert_eq!(table.level_for_elapsed(12_000), 2);
        assert_eq!(table.level_for_elapsed(47_999), 4);
        assert_eq!(table.level_for_elapsed(48_000), 5);
        assert_eq!(table.level_for_elapsed(600_000), 5);
    }

    #[test]
    fn test_combo_multiplier_steps() {
        let combo = EngineConfig::default().combo;
        assert_eq!(combo.multiplier_for(0), 1.0);
        assert_eq!(combo.multiplier_for(9), 1.0);
        assert_eq!(combo.multiplier_for(10), 2.0);
        assert_eq!(combo.multiplier_for(25), 3.0);
        assert_eq!(combo.multiplier_for(39), 4.0);
        assert_eq!(combo.multiplier_for(400), 5.0);
    }

    #[test]
    fn test_rejects_empty_active_types() {
        let mut config = EngineConfig::default();
        config.levels[2].active_types.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyActiveTypes { level: 3 }));
    }

    #[test]
    fn test_rejects_zero_probability_level() {
        let mut config = EngineConfig::default();
        for ty in &mut config.bubble_types {
            if ty.name == "bomb" {
                ty.spawn_probability = 0.0;
            }
        }
        config.levels[0].active_types = vec!["bomb".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveProbability { level: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_type() {
        let mut config = EngineConfig::default();
        config.levels[1].active_types.push("ghost".to_string());
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownBubbleType {
                level: 2,
                name: "ghost".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_shrinking_combo_boost() {
        let mut config = EngineConfig::default();
        config.effects.combo_boost_factor = 0.5;
        assert_eq!(config.validate(), Err(ConfigError::InvalidBoostFactor { factor: 0.5 }));

        let mut config = EngineConfig::default();
        config.effects.combo_boost_factor = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_points_factor() {
        let mut config = EngineConfig::default();
        config.power_ups.points_factor = -3.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPointsFactor { factor: -3.0 }));

        let mut config = EngineConfig::default();
        config.power_ups.points_factor = f32::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPointsFactor { .. })));
    }

    #[test]
    fn test_rejects_magnet_factor_outside_unit_range() {
        for factor in [0.0, -0.5, 1.5, f32::NAN] {
            let mut config = EngineConfig::default();
            config.power_ups.magnet_speed_factor = factor;
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidMagnetFactor { .. })),
                "magnet factor {} accepted",
                factor
            );
        }
        let mut config = EngineConfig::default();
        config.power_ups.magnet_speed_factor = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_unordered_levels() {
        let mut config = EngineConfig::default();
        config.levels[3].starts_at_ms = 24_000;
        assert_eq!(config.validate(), Err(ConfigError::LevelsOutOfOrder { level: 4 }));
    }

    #[test]
    fn test_rejects_non_monotone_combo() {
        let mut config = EngineConfig::default();
        config.combo.steps[2].multiplier = 2.5;
        assert_eq!(config.validate(), Err(ConfigError::NonMonotoneCombo { index: 2 }));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let mut config = EngineConfig::default();
        config.bubble_types[0].speed_range = (80.0, 40.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { field: RangeField::Speed, .. })
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_tables() {
        let json = serde_json::to_string(&EngineConfig::default()).unwrap();
        assert!(json.contains("\"spawnIntervalMs\":800"));
        assert!(json.contains("\"effect\":\"resetCombo\""));
        let parsed = EngineConfig::from_json(&json).unwrap();
        assert_eq!(parsed, EngineConfig::default());
    }

    #[test]
    fn test_from_json_reports_parse_errors() {
        assert!(matches!(EngineConfig::from_json("{"), Err(ConfigError::Json(_))));
    }
}
