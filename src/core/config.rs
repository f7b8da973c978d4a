//! Detection configuration with documented constants
//!
//! A config is built once per session (see [`crate::session`]) and passed
//! explicitly to whatever needs it. It can be loaded from TOML:
//!
//! ```toml
//! seed = 1234
//! base_difficulty = 10
//! intensity_divisor = 5
//!
//! [[channels]]
//! channel = "Visual"
//! shape = "Line"
//! occludes = true
//! tapers = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{DetectionError, Result};
use crate::perception::diffuser::{DelayPolicy, DiffuserKind};
use crate::perception::purview::PurviewShape;
use crate::perception::registry::DuplicatePolicy;
use crate::stealth::channel::SenseChannel;

/// Base difficulty of a contested perception save before the hider adds anything
pub const DEFAULT_BASE_DIFFICULTY: i32 = 10;

/// Alert intensity points per +1 on the perceiver's save roll
pub const DEFAULT_INTENSITY_DIVISOR: u32 = 5;

/// Default session seed
pub const DEFAULT_SEED: u64 = 0x5EED;

/// How a channel's purview is shaped when a perception is created from config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelProfile {
    pub channel: SenseChannel,
    pub shape: PurviewShape,
    #[serde(default)]
    pub occludes: bool,
    #[serde(default)]
    pub tapers: bool,
    #[serde(default)]
    pub diffuser: Option<DiffuserKind>,
}

impl ChannelProfile {
    /// Built-in profile for a channel
    ///
    /// Sight and heat travel in straight lines and are stopped by walls.
    /// Sound follows walkable paths. Smell, touch and the sixth sense fill
    /// an area around the perceiver.
    pub fn builtin(channel: SenseChannel) -> Self {
        let (shape, occludes, tapers, diffuser) = match channel {
            SenseChannel::Kinesthetic => {
                (PurviewShape::Area, false, false, Some(DiffuserKind::Linear))
            }
            SenseChannel::Thermal => (PurviewShape::Line, true, true, None),
            SenseChannel::Olfactory => (
                PurviewShape::Area,
                false,
                true,
                Some(DiffuserKind::DelayedLinear {
                    delay: DelayPolicy::Percent(25),
                }),
            ),
            SenseChannel::Auditory => (
                PurviewShape::Pathing,
                false,
                true,
                Some(DiffuserKind::Exponential { amount: 0.9 }),
            ),
            SenseChannel::Visual => (PurviewShape::Line, true, true, None),
            SenseChannel::Sixth => (PurviewShape::Area, false, false, None),
            SenseChannel::Psionic => (PurviewShape::Line, false, false, None),
            SenseChannel::Other | SenseChannel::None => (PurviewShape::Line, false, false, None),
        };
        Self {
            channel,
            shape,
            occludes,
            tapers,
            diffuser,
        }
    }
}

/// Configuration for detection resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Seed for the session dice
    pub seed: u64,

    /// Difficulty floor of every contested save
    pub base_difficulty: i32,

    /// Alert intensity is divided by this to produce the perceiver's roll bonus.
    ///
    /// A melee strike's kinesthetic alert (30) at the default divisor (5)
    /// grants +6 on the save.
    pub intensity_divisor: u32,

    /// Debug override: natural 1s and 20s lose their automatic outcome
    pub godmode: bool,

    /// What happens when a perception is added for an already-held channel
    pub duplicate_policy: DuplicatePolicy,

    /// Per-channel overrides; channels not listed use [`ChannelProfile::builtin`]
    pub channels: Vec<ChannelProfile>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            base_difficulty: DEFAULT_BASE_DIFFICULTY,
            intensity_divisor: DEFAULT_INTENSITY_DIVISOR,
            godmode: false,
            duplicate_policy: DuplicatePolicy::Override,
            channels: Vec::new(),
        }
    }
}

impl DetectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DetectionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Profile for a channel, falling back to the built-in one
    pub fn profile(&self, channel: SenseChannel) -> ChannelProfile {
        self.channels
            .iter()
            .find(|p| p.channel == channel)
            .cloned()
            .unwrap_or_else(|| ChannelProfile::builtin(channel))
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.intensity_divisor == 0 {
            return Err(DetectionError::InvalidConfig(
                "intensity_divisor must be positive".into(),
            ));
        }

        for (i, profile) in self.channels.iter().enumerate() {
            if self.channels[..i].iter().any(|p| p.channel == profile.channel) {
                return Err(DetectionError::InvalidConfig(format!(
                    "channel {:?} configured more than once",
                    profile.channel
                )));
            }
            if let Some(DiffuserKind::Exponential { amount }) = profile.diffuser {
                if !(amount > 0.0 && amount <= 1.0) {
                    return Err(DetectionError::InvalidConfig(format!(
                        "exponential amount for {:?} must be in (0, 1], got {}",
                        profile.channel, amount
                    )));
                }
            }
        }

        Ok(())
    }
}
