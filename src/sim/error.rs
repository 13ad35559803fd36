//! Engine error types
//!
//! Configuration problems are fatal and rejected before any session starts.
//! Transition errors are returned for lifecycle calls made in the wrong phase.

use std::fmt;

use super::state::Phase;

/// Which numeric range of a bubble type is malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeField {
    Radius,
    Speed,
}

impl fmt::Display for RangeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radius => write!(f, "radius"),
            Self::Speed => write!(f, "speed"),
        }
    }
}

/// Rejected engine configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NoBubbleTypes,
    DuplicateBubbleType { name: String },
    InvalidRange { name: String, field: RangeField, min: f32, max: f32 },
    NoLevels,
    FirstLevelNotAtZero { starts_at_ms: u64 },
    LevelsOutOfOrder { level: u32 },
    EmptyActiveTypes { level: u32 },
    UnknownBubbleType { level: u32, name: String },
    NonPositiveProbability { level: u32, total: f32 },
    InvalidSpawnInterval { level: u32 },
    InvalidSpeedMultiplier { level: u32, multiplier: f32 },
    NonMonotoneCombo { index: usize },
    InvalidArena { width: f32, height: f32 },
    ZeroSessionDuration,
    /// Combo boost would lower the multiplier
    InvalidBoostFactor { factor: f32 },
    InvalidPointsFactor { factor: f32 },
    /// Magnet must slow bubbles without stopping them
    InvalidMagnetFactor { factor: f32 },
    Json(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoBubbleTypes => write!(f, "no bubble types configured"),
            Self::DuplicateBubbleType { name } => {
                write!(f, "bubble type '{name}' is defined more than once")
            }
            Self::InvalidRange { name, field, min, max } => {
                write!(f, "bubble type '{name}' has an invalid {field} range [{min}, {max}]")
            }
            Self::NoLevels => write!(f, "level table is empty"),
            Self::FirstLevelNotAtZero { starts_at_ms } => {
                write!(f, "level 1 must start at 0ms, found {starts_at_ms}ms")
            }
            Self::LevelsOutOfOrder { level } => {
                write!(f, "level {level} does not start after the previous level")
            }
            Self::EmptyActiveTypes { level } => {
                write!(f, "level {level} has no active bubble types")
            }
            Self::UnknownBubbleType { level, name } => {
                write!(f, "level {level} references unknown bubble type '{name}'")
            }
            Self::NonPositiveProbability { level, total } => {
                write!(f, "level {level} spawn probabilities sum to {total}, expected > 0")
            }
            Self::InvalidSpawnInterval { level } => {
                write!(f, "level {level} spawn interval must be positive")
            }
            Self::InvalidSpeedMultiplier { level, multiplier } => {
                write!(f, "level {level} speed multiplier {multiplier} must be positive")
            }
            Self::NonMonotoneCombo { index } => {
                write!(f, "combo step {index} does not increase streak and multiplier")
            }
            Self::InvalidArena { width, height } => {
                write!(f, "arena size {width}x{height} must be positive")
            }
            Self::ZeroSessionDuration => write!(f, "session duration must be positive"),
            Self::InvalidBoostFactor { factor } => {
                write!(f, "combo boost factor {factor} must be at least 1")
            }
            Self::InvalidPointsFactor { factor } => {
                write!(f, "power-up points factor {factor} must be positive")
            }
            Self::InvalidMagnetFactor { factor } => {
                write!(f, "magnet speed factor {factor} must be in (0, 1]")
            }
            Self::Json(msg) => write!(f, "invalid configuration JSON: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A lifecycle operation was called in a phase that does not accept it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub operation: &'static str,
    pub phase: Phase,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {} while {:?}", self.operation, self.phase)
    }
}

impl std::error::Error for TransitionError {}
