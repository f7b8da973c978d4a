pub mod config;
pub mod dice;
pub mod error;
pub mod types;

pub use config::{ChannelProfile, DetectionConfig};
pub use dice::{RandomProvider, ScriptedDice, SeededDice};
pub use error::{DetectionError, Result};
pub use types::{ActionId, EntityId, RegionId, Tick};
