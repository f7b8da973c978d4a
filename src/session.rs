//! Detection session: configuration, dice and hooks shared by every
//! resolution in a run
//!
//! A session is created once per simulation run and passed by reference.
//! Two sessions built from the same config (and therefore the same seed)
//! resolve the same sequence of actions identically.

use std::path::Path;

use crate::core::config::DetectionConfig;
use crate::core::dice::{RandomProvider, SeededDice};
use crate::core::error::Result;
use crate::core::types::{EntityId, Tick};
use crate::detection::opinion::Detection;
use crate::detection::resolver::DetectionResolver;
use crate::detection::scheduler::BehaviorScheduler;
use crate::perception::modifiers::{Modifier, ModifierChain};
use crate::perception::registry::PerceptionSet;
use crate::perception::save::SaveRules;
use crate::perception::sense::Perception;
use crate::stealth::action::ConcealedAction;
use crate::stealth::channel::SenseChannel;
use crate::world::agent::AgentSnapshot;
use crate::world::geometry::{Geometry, LocationTracker};

/// Host-side world access for one resolution
#[derive(Clone, Copy)]
pub struct Surroundings<'a> {
    pub geometry: &'a dyn Geometry,
    pub tracker: &'a dyn LocationTracker,
}

/// An agent watching for covert actions, with its senses
#[derive(Debug, Clone)]
pub struct Observer {
    pub agent: AgentSnapshot,
    pub senses: PerceptionSet,
}

impl Observer {
    pub fn new(agent: AgentSnapshot, senses: PerceptionSet) -> Self {
        Self { agent, senses }
    }
}

#[derive(Debug)]
pub struct DetectionSession<R: RandomProvider = SeededDice> {
    config: DetectionConfig,
    dice: R,
    modifiers: ModifierChain,
    tick: Tick,
}

impl DetectionSession<SeededDice> {
    /// Session with dice seeded from `config.seed`
    pub fn new(config: DetectionConfig) -> Result<Self> {
        let dice = SeededDice::new(config.seed);
        Self::with_dice(config, dice)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::new(DetectionConfig::load(path)?)
    }

    /// Restart the random sequence from `seed`
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.dice = SeededDice::new(seed);
    }
}

impl<R: RandomProvider> DetectionSession<R> {
    pub fn with_dice(config: DetectionConfig, dice: R) -> Result<Self> {
        config.validate()?;
        tracing::debug!(seed = config.seed, godmode = config.godmode, "detection session started");
        Ok(Self {
            config,
            dice,
            modifiers: ModifierChain::new(),
            tick: 0,
        })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn dice_mut(&mut self) -> &mut R {
        &mut self.dice
    }

    pub fn modifiers(&self) -> &ModifierChain {
        &self.modifiers
    }

    pub fn modifiers_mut(&mut self) -> &mut ModifierChain {
        &mut self.modifiers
    }

    pub fn register_modifier(&mut self, modifier: Box<dyn Modifier>) {
        self.modifiers.register(modifier);
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn advance_tick(&mut self) -> Tick {
        self.tick += 1;
        self.tick
    }

    pub fn rules(&self) -> SaveRules {
        SaveRules::from_config(&self.config)
    }

    /// Perception shaped by this session's profile for `channel`
    pub fn perception(
        &self,
        owner: EntityId,
        channel: SenseChannel,
        score: i32,
        radius: i32,
    ) -> Perception {
        Perception::from_profile(owner, &self.config.profile(channel), score, radius)
    }

    /// Empty perception set following this session's duplicate policy
    pub fn perception_set(&self, owner: EntityId) -> PerceptionSet {
        PerceptionSet::new(owner, self.config.duplicate_policy)
    }

    /// Resolve `action` against one perceiver and deliver any detection
    pub fn resolve(
        &mut self,
        surroundings: &Surroundings<'_>,
        action: &ConcealedAction,
        perceiver: &AgentSnapshot,
        hider: &AgentSnapshot,
        senses: &mut PerceptionSet,
        scheduler: &mut dyn BehaviorScheduler,
    ) -> Option<Detection> {
        let resolver = DetectionResolver::new(
            SaveRules::from_config(&self.config),
            &self.modifiers,
            surroundings.geometry,
            surroundings.tracker,
        )
        .at_tick(self.tick);
        resolver.resolve_and_deliver(action, perceiver, hider, senses, &mut self.dice, scheduler)
    }

    /// Resolve `action` against every observer in order
    pub fn resolve_all(
        &mut self,
        surroundings: &Surroundings<'_>,
        action: &ConcealedAction,
        hider: &AgentSnapshot,
        observers: &mut [Observer],
        scheduler: &mut dyn BehaviorScheduler,
    ) -> Vec<Detection> {
        let detections: Vec<Detection> = observers
            .iter_mut()
            .filter_map(|observer| {
                self.resolve(
                    surroundings,
                    action,
                    &observer.agent,
                    hider,
                    &mut observer.senses,
                    scheduler,
                )
            })
            .collect();

        tracing::debug!(
            action = action.name(),
            observers = observers.len(),
            detected = detections.len(),
            "action resolved"
        );
        detections
    }
}
