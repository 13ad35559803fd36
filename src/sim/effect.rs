//! Pop side effects
//!
//! A pure mapping from (effect, session state) to a state mutation. The
//! engine turns the returned outcome into presentation events.

use super::config::{Effect, EffectConfig};
use super::state::{SessionState, US_PER_MS};

/// What an applied effect changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectOutcome {
    TimeAdded { added_ms: u64, time_left_ms: i64 },
    ComboBoosted { multiplier: f32 },
    ComboReset,
}

/// Apply a popped bubble's effect to the session
pub fn apply_effect(effect: Effect, state: &mut SessionState, config: &EffectConfig) -> Option<EffectOutcome> {
    match effect {
        Effect::None => None,
        Effect::AddTime => {
            state.time_left_us += (config.time_bonus_ms * US_PER_MS) as i64;
            Some(EffectOutcome::TimeAdded {
                added_ms: config.time_bonus_ms,
                time_left_ms: state.time_left_ms(),
            })
        }
        Effect::BoostCombo => {
            state.combo.multiplier *= config.combo_boost_factor;
            Some(EffectOutcome::ComboBoosted {
                multiplier: state.combo.multiplier,
            })
        }
        Effect::ResetCombo => {
            state.combo.reset();
            Some(EffectOutcome::ComboReset)
        }
    }
}
