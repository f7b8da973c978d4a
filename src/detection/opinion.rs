//! The record handed to behavior when a perceiver notices something

use serde::{Deserialize, Serialize};

use crate::core::types::{ActionId, EntityId, Tick};
use crate::perception::awareness::AwarenessLevel;
use crate::perception::save::SaveOutcome;
use crate::stealth::action::ConcealedAction;
use crate::stealth::channel::SenseChannel;
use crate::world::hex::HexCoord;

/// One channel's result during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelVerdict {
    pub channel: SenseChannel,
    pub location: HexCoord,
    pub distance: u32,
    pub rating: i32,
    pub save: SaveOutcome,
    pub level: AwarenessLevel,
}

impl ChannelVerdict {
    /// Higher level wins, then the higher-priority channel
    pub fn outranks(&self, other: &ChannelVerdict) -> bool {
        (self.level, self.channel.priority()) > (other.level, other.channel.priority())
    }
}

/// A perceiver's opinion that a concealed action happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    tick: Tick,
    perceiver: EntityId,
    hider: EntityId,
    action: ActionId,
    action_name: String,
    channel: SenseChannel,
    rating: i32,
    save: SaveOutcome,
    location: HexCoord,
    level: AwarenessLevel,
    can_engage: bool,
}

/// Alias used by behavior code
pub type Opinion = Detection;

impl Detection {
    /// `None` unless the verdict noticed something
    pub fn from_verdict(
        tick: Tick,
        perceiver: EntityId,
        action: &ConcealedAction,
        verdict: &ChannelVerdict,
    ) -> Option<Self> {
        if !verdict.level.is_detected() {
            return None;
        }

        Some(Self {
            tick,
            perceiver,
            hider: action.actor(),
            action: action.id(),
            action_name: action.name().to_string(),
            channel: verdict.channel,
            rating: verdict.rating,
            save: verdict.save,
            location: verdict.location,
            level: verdict.level,
            can_engage: action.is_aggressive(),
        })
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn perceiver(&self) -> EntityId {
        self.perceiver
    }

    pub fn hider(&self) -> EntityId {
        self.hider
    }

    pub fn action(&self) -> ActionId {
        self.action
    }

    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    pub fn channel(&self) -> SenseChannel {
        self.channel
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    pub fn save(&self) -> &SaveOutcome {
        &self.save
    }

    pub fn location(&self) -> HexCoord {
        self.location
    }

    pub fn level(&self) -> AwarenessLevel {
        self.level
    }

    /// The perceiver may fight back while reacting
    pub fn can_engage(&self) -> bool {
        self.can_engage
    }
}
