use serde::{Deserialize, Serialize};

/// How much a perceiver has noticed, from nothing to full alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum AwarenessLevel {
    #[default]
    None = 0,
    Awake = 1,
    Suspect = 2,
    Aware = 3,
    Alert = 4,
}

impl AwarenessLevel {
    /// Every 20 points of roll is one band: `ceil((roll + 1) / 20 - 1)`,
    /// clamped to the valid range.
    pub fn from_roll(roll: i32) -> Self {
        let band = ((f64::from(roll) + 1.0) / 20.0 - 1.0).ceil();
        Self::from_band(band.clamp(0.0, 4.0) as u8)
    }

    pub fn from_band(band: u8) -> Self {
        match band {
            0 => AwarenessLevel::None,
            1 => AwarenessLevel::Awake,
            2 => AwarenessLevel::Suspect,
            3 => AwarenessLevel::Aware,
            _ => AwarenessLevel::Alert,
        }
    }

    pub fn band(&self) -> u8 {
        *self as u8
    }

    /// Anything above `None` counts as a detection
    pub fn is_detected(&self) -> bool {
        *self > AwarenessLevel::None
    }

    pub fn name(&self) -> &'static str {
        match self {
            AwarenessLevel::None => "none",
            AwarenessLevel::Awake => "awake",
            AwarenessLevel::Suspect => "suspect",
            AwarenessLevel::Aware => "aware",
            AwarenessLevel::Alert => "alert",
        }
    }
}
