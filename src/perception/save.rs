//! Contested perception save
//!
//! The perceiver rolls a d20 plus a bonus from the alert's intensity
//! (attenuated by distance) against a difficulty built from the hider's
//! concealment. A natural 20 always succeeds and a natural 1 always fails,
//! unless godmode is on.

use serde::{Deserialize, Serialize};

use crate::core::config::DetectionConfig;
use crate::core::dice::RandomProvider;
use crate::perception::modifiers::{ModifierChain, ModifierContext, ModifierStage};

/// Session-wide parameters of a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveRules {
    pub base_difficulty: i32,
    pub intensity_divisor: u32,
    pub godmode: bool,
}

impl SaveRules {
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            base_difficulty: config.base_difficulty,
            intensity_divisor: config.intensity_divisor,
            godmode: config.godmode,
        }
    }

    /// `floor(intensity * retained) / divisor`
    pub fn intensity_bonus(&self, intensity: u32, retained: f64) -> i32 {
        let attenuated = (f64::from(intensity) * retained.max(0.0)).floor();
        let attenuated = attenuated.min(f64::from(i32::MAX)) as i32;
        attenuated / self.intensity_divisor.max(1) as i32
    }
}

/// Inputs specific to one alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveRequest {
    /// Hider's concealment rating on the alert's channel
    pub alert_rating: i32,
    /// Hider's stat modifier
    pub stat_modifier: i32,
    pub intensity_bonus: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub natural: i32,
    pub roll: i32,
    pub difficulty: i32,
    pub success: bool,
    pub margin: u32,
}

pub fn make_save(
    rules: &SaveRules,
    request: &SaveRequest,
    context: &ModifierContext<'_>,
    modifiers: &ModifierChain,
    dice: &mut dyn RandomProvider,
) -> SaveOutcome {
    let natural = dice.d20();

    let difficulty = rules
        .base_difficulty
        .saturating_add(request.alert_rating)
        .saturating_add(request.stat_modifier);
    let roll = natural.saturating_add(request.intensity_bonus);

    let roll = modifiers.fold(ModifierStage::Roll, context, roll);
    let difficulty = modifiers.fold(ModifierStage::Difficulty, context, difficulty);

    let success = if rules.godmode {
        roll >= difficulty
    } else {
        match natural {
            20 => true,
            1 => false,
            _ => roll >= difficulty,
        }
    };

    let outcome = SaveOutcome {
        natural,
        roll,
        difficulty,
        success,
        margin: roll.abs_diff(difficulty),
    };

    tracing::trace!(
        channel = ?context.channel,
        natural,
        roll,
        difficulty,
        success,
        "perception save"
    );

    outcome
}
