//! Covert actions and the per-channel alerts they give off

pub mod action;
pub mod alert;
pub mod channel;
pub mod policy;

pub use action::{ActionKind, ActionMetadata, ConcealedAction, ConcealedActionBuilder, TriggerEvent};
pub use alert::{Alert, AlertBuilder, SourceContext};
pub use channel::SenseChannel;
pub use policy::{weapon_tier_adjustment, ActionPolicy, ChannelIntensityPolicy, WeaponTierPolicy};
