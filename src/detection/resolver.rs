//! Resolve a concealed action against one perceiver
//!
//! Every alert with a usable, in-range perception gets a perception roll
//! and a contested save. The strongest awareness wins; equal levels go to
//! the channel with the higher fixed priority. Only a level above `None`
//! becomes a [`Detection`].

use crate::core::dice::RandomProvider;
use crate::core::types::Tick;
use crate::detection::opinion::{ChannelVerdict, Detection};
use crate::detection::scheduler::BehaviorScheduler;
use crate::perception::awareness::AwarenessLevel;
use crate::perception::modifiers::{ModifierChain, ModifierContext, ModifierStage};
use crate::perception::registry::PerceptionSet;
use crate::perception::save::{make_save, SaveRequest, SaveRules};
use crate::stealth::action::ConcealedAction;
use crate::world::agent::AgentSnapshot;
use crate::world::geometry::{Geometry, LocationTracker};

pub struct DetectionResolver<'a> {
    pub tick: Tick,
    pub rules: SaveRules,
    pub modifiers: &'a ModifierChain,
    pub geometry: &'a dyn Geometry,
    pub tracker: &'a dyn LocationTracker,
}

impl<'a> DetectionResolver<'a> {
    pub fn new(
        rules: SaveRules,
        modifiers: &'a ModifierChain,
        geometry: &'a dyn Geometry,
        tracker: &'a dyn LocationTracker,
    ) -> Self {
        Self {
            tick: 0,
            rules,
            modifiers,
            geometry,
            tracker,
        }
    }

    pub fn at_tick(mut self, tick: Tick) -> Self {
        self.tick = tick;
        self
    }

    /// Per-channel results, in alert order. Empty when the participants
    /// cannot take part.
    pub fn evaluate(
        &self,
        action: &ConcealedAction,
        perceiver: &AgentSnapshot,
        hider: &AgentSnapshot,
        senses: &mut PerceptionSet,
        dice: &mut dyn RandomProvider,
    ) -> Vec<ChannelVerdict> {
        if !participants_valid(action, perceiver, hider) {
            tracing::debug!(
                action = action.name(),
                perceiver = ?perceiver.id,
                hider = ?hider.id,
                "abandoning resolution: participants not in a shared live context"
            );
            return Vec::new();
        }
        let Some(origin) = perceiver.location else {
            return Vec::new();
        };
        senses.sync_geometry(self.geometry.revision());

        let mut verdicts = Vec::with_capacity(action.alerts().len());
        for alert in action.alerts() {
            let channel = alert.channel();
            let Some(perception) = senses.slot_mut(channel) else {
                continue;
            };
            if !perception.validate(perceiver) {
                tracing::trace!(?channel, "perception unusable");
                continue;
            }

            let location = alert.source().location(self.tracker);
            let distance = self.geometry.distance(origin, location);
            let context = ModifierContext {
                perceiver,
                hider,
                channel,
                distance: Some(distance),
            };

            let reach = self.modifiers.fold(ModifierStage::PurviewReach, &context, 0);
            perception.purview_mut().apply_adjustment(reach);
            if !perception.in_purview(perceiver, location, self.geometry) {
                tracing::trace!(?channel, distance, "alert outside purview");
                continue;
            }

            let rating = perception.roll_at(perceiver, hider, Some(location), self.geometry, dice);
            let request = SaveRequest {
                alert_rating: hider.concealment.rating(channel),
                stat_modifier: hider.concealment.stat_modifier,
                intensity_bonus: self
                    .rules
                    .intensity_bonus(alert.intensity(), perception.purview().diffuse(distance)),
            };
            let save = make_save(&self.rules, &request, &context, self.modifiers, dice);
            let level = if save.success {
                perception.awareness(rating)
            } else {
                AwarenessLevel::None
            };

            verdicts.push(ChannelVerdict {
                channel,
                location,
                distance,
                rating,
                save,
                level,
            });
        }

        verdicts
    }

    /// The winning detection, if anything was noticed
    pub fn resolve(
        &self,
        action: &ConcealedAction,
        perceiver: &AgentSnapshot,
        hider: &AgentSnapshot,
        senses: &mut PerceptionSet,
        dice: &mut dyn RandomProvider,
    ) -> Option<Detection> {
        let verdicts = self.evaluate(action, perceiver, hider, senses, dice);
        let best = select_best(&verdicts)?;
        let detection = Detection::from_verdict(self.tick, perceiver.id, action, best)?;

        tracing::debug!(
            action = action.name(),
            perceiver = ?perceiver.id,
            channel = ?detection.channel(),
            level = detection.level().name(),
            "action detected"
        );
        Some(detection)
    }

    /// Resolve and hand any detection to the scheduler
    pub fn resolve_and_deliver(
        &self,
        action: &ConcealedAction,
        perceiver: &AgentSnapshot,
        hider: &AgentSnapshot,
        senses: &mut PerceptionSet,
        dice: &mut dyn RandomProvider,
        scheduler: &mut dyn BehaviorScheduler,
    ) -> Option<Detection> {
        let detection = self.resolve(action, perceiver, hider, senses, dice)?;
        scheduler.schedule(&detection);
        Some(detection)
    }
}

fn participants_valid(
    action: &ConcealedAction,
    perceiver: &AgentSnapshot,
    hider: &AgentSnapshot,
) -> bool {
    hider.id == action.actor() && perceiver.id != hider.id && perceiver.shares_context(hider)
}

/// Highest level above `None`; ties go to channel priority
pub fn select_best(verdicts: &[ChannelVerdict]) -> Option<&ChannelVerdict> {
    verdicts
        .iter()
        .filter(|v| v.level.is_detected())
        .fold(None, |best: Option<&ChannelVerdict>, v| match best {
            Some(current) if !v.outranks(current) => Some(current),
            _ => Some(v),
        })
}
