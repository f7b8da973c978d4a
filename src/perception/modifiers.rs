//! Registered hooks that adjust rolls, difficulties and reach
//!
//! A hook belongs to exactly one stage. When a stage runs, every hook
//! registered for it is folded over the value in registration order, each
//! one seeing the previous hook's output.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stealth::channel::SenseChannel;
use crate::world::agent::AgentSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierStage {
    /// The perceiver's save roll
    Roll,
    /// The difficulty the save is made against
    Difficulty,
    /// Adjustment added to a purview's reach
    PurviewReach,
}

/// What a hook can see about the contest it is adjusting
#[derive(Debug, Clone, Copy)]
pub struct ModifierContext<'a> {
    pub perceiver: &'a AgentSnapshot,
    pub hider: &'a AgentSnapshot,
    pub channel: SenseChannel,
    pub distance: Option<u32>,
}

pub trait Modifier {
    fn name(&self) -> &str;
    fn stage(&self) -> ModifierStage;
    fn apply(&self, context: &ModifierContext<'_>, value: i32) -> i32;
}

/// Flat bonus or penalty, optionally limited to one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatModifier {
    pub name: String,
    pub stage: ModifierStage,
    pub channel: Option<SenseChannel>,
    pub delta: i32,
}

impl FlatModifier {
    pub fn new(name: impl Into<String>, stage: ModifierStage, delta: i32) -> Self {
        Self {
            name: name.into(),
            stage,
            channel: None,
            delta,
        }
    }

    pub fn on_channel(mut self, channel: SenseChannel) -> Self {
        self.channel = Some(channel);
        self
    }
}

impl Modifier for FlatModifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn stage(&self) -> ModifierStage {
        self.stage
    }

    fn apply(&self, context: &ModifierContext<'_>, value: i32) -> i32 {
        match self.channel {
            Some(channel) if channel != context.channel => value,
            _ => value.saturating_add(self.delta),
        }
    }
}

/// Ordered hook registry
#[derive(Default)]
pub struct ModifierChain {
    hooks: Vec<Box<dyn Modifier>>,
}

impl ModifierChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, modifier: Box<dyn Modifier>) {
        tracing::debug!(name = modifier.name(), stage = ?modifier.stage(), "modifier registered");
        self.hooks.push(modifier);
    }

    /// Remove every hook with this name. Returns how many were removed.
    pub fn unregister(&mut self, name: &str) -> usize {
        let before = self.hooks.len();
        self.hooks.retain(|hook| hook.name() != name);
        before - self.hooks.len()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn fold(&self, stage: ModifierStage, context: &ModifierContext<'_>, value: i32) -> i32 {
        self.hooks
            .iter()
            .filter(|hook| hook.stage() == stage)
            .fold(value, |acc, hook| hook.apply(context, acc))
    }
}

impl fmt::Debug for ModifierChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|hook| (hook.name(), hook.stage())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{EntityId, RegionId};
    use crate::world::hex::HexCoord;

    struct Doubler;

    impl Modifier for Doubler {
        fn name(&self) -> &str {
            "doubler"
        }

        fn stage(&self) -> ModifierStage {
            ModifierStage::Roll
        }

        fn apply(&self, _context: &ModifierContext<'_>, value: i32) -> i32 {
            value * 2
        }
    }

    fn agent() -> AgentSnapshot {
        AgentSnapshot::new(EntityId::new(), RegionId::new(1), HexCoord::new(0, 0))
    }

    #[test]
    fn test_fold_in_registration_order() {
        let perceiver = agent();
        let hider = agent();
        let context = ModifierContext {
            perceiver: &perceiver,
            hider: &hider,
            channel: SenseChannel::Visual,
            distance: Some(3),
        };

        let mut chain = ModifierChain::new();
        chain.register(Box::new(FlatModifier::new("torch", ModifierStage::Roll, 3)));
        chain.register(Box::new(Doubler));
        assert_eq!(chain.fold(ModifierStage::Roll, &context, 5), 16);

        let mut reversed = ModifierChain::new();
        reversed.register(Box::new(Doubler));
        reversed.register(Box::new(FlatModifier::new("torch", ModifierStage::Roll, 3)));
        assert_eq!(reversed.fold(ModifierStage::Roll, &context, 5), 13);
    }

    #[test]
    fn test_stage_filtering() {
        let perceiver = agent();
        let hider = agent();
        let context = ModifierContext {
            perceiver: &perceiver,
            hider: &hider,
            channel: SenseChannel::Visual,
            distance: None,
        };

        let mut chain = ModifierChain::new();
        chain.register(Box::new(FlatModifier::new("fog", ModifierStage::PurviewReach, -4)));
        assert_eq!(chain.fold(ModifierStage::Roll, &context, 7), 7);
        assert_eq!(chain.fold(ModifierStage::PurviewReach, &context, 0), -4);
    }

    #[test]
    fn test_channel_scoped_modifier() {
        let perceiver = agent();
        let hider = agent();
        let mut context = ModifierContext {
            perceiver: &perceiver,
            hider: &hider,
            channel: SenseChannel::Auditory,
            distance: None,
        };

        let muffled = FlatModifier::new("muffled", ModifierStage::Difficulty, 4)
            .on_channel(SenseChannel::Auditory);
        assert_eq!(muffled.apply(&context, 10), 14);
        context.channel = SenseChannel::Visual;
        assert_eq!(muffled.apply(&context, 10), 10);
    }

    #[test]
    fn test_unregister() {
        let mut chain = ModifierChain::new();
        chain.register(Box::new(FlatModifier::new("a", ModifierStage::Roll, 1)));
        chain.register(Box::new(FlatModifier::new("b", ModifierStage::Roll, 1)));
        chain.register(Box::new(FlatModifier::new("a", ModifierStage::Difficulty, 1)));
        assert_eq!(chain.unregister("a"), 2);
        assert_eq!(chain.len(), 1);
    }
}
