//! Concealed actions: a covert event plus the alerts it gives off
//!
//! A `ConcealedAction` is created at the moment of the event, resolved
//! against every nearby perceiver, then dropped.

use serde::{Deserialize, Serialize};

use crate::core::error::{DetectionError, Result};
use crate::core::types::{ActionId, EntityId};
use crate::stealth::alert::{Alert, SourceContext};
use crate::stealth::channel::SenseChannel;
use crate::stealth::policy::ActionPolicy;
use crate::world::hex::HexCoord;

/// Broad category of covert action; decides the default alert set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    MeleeStrike,
    RangedShot,
    Theft,
    Sneak,
    Spellcast,
    Custom,
}

impl ActionKind {
    /// Channel/intensity pairs populated by [`ConcealedAction::initialize`]
    pub fn default_alerts(&self) -> &'static [(SenseChannel, u32)] {
        match self {
            ActionKind::MeleeStrike => &[
                (SenseChannel::Kinesthetic, 30),
                (SenseChannel::Visual, 15),
                (SenseChannel::Auditory, 12),
            ],
            ActionKind::RangedShot => &[
                (SenseChannel::Visual, 12),
                (SenseChannel::Auditory, 10),
                (SenseChannel::Kinesthetic, 4),
            ],
            ActionKind::Theft => &[(SenseChannel::Kinesthetic, 10), (SenseChannel::Visual, 8)],
            ActionKind::Sneak => &[
                (SenseChannel::Auditory, 6),
                (SenseChannel::Visual, 5),
                (SenseChannel::Olfactory, 3),
                (SenseChannel::Thermal, 2),
            ],
            ActionKind::Spellcast => &[
                (SenseChannel::Psionic, 20),
                (SenseChannel::Sixth, 10),
                (SenseChannel::Visual, 8),
            ],
            ActionKind::Custom => &[],
        }
    }

    /// Does this kind of action involve a weapon?
    pub fn uses_weapon(&self) -> bool {
        matches!(self, ActionKind::MeleeStrike | ActionKind::RangedShot)
    }

    /// Hostile actions leave the perceiver free to fight back
    pub fn is_aggressive(&self) -> bool {
        matches!(
            self,
            ActionKind::MeleeStrike | ActionKind::RangedShot | ActionKind::Spellcast
        )
    }
}

/// Generic host event an action can be derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerEvent {
    MeleeStrike { weapon_tier: Option<u8> },
    RangedShot {
        weapon_tier: Option<u8>,
        projectile: Option<EntityId>,
    },
    Theft { item: String },
    Sneak,
    Spellcast { spell: String },
    Custom { name: String, description: String },
}

/// Descriptive data for an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMetadata {
    pub name: String,
    pub description: String,
    pub kind: ActionKind,
}

impl ActionMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
        }
    }

    /// Derive name, description and kind from a triggering event
    pub fn from_event(event: &TriggerEvent) -> Self {
        match event {
            TriggerEvent::MeleeStrike { .. } => Self::new(
                "melee_strike",
                "Struck at a target in close combat",
                ActionKind::MeleeStrike,
            ),
            TriggerEvent::RangedShot { .. } => {
                Self::new("ranged_shot", "Loosed a missile at a target", ActionKind::RangedShot)
            }
            TriggerEvent::Theft { item } => {
                Self::new("theft", format!("Lifted {}", item), ActionKind::Theft)
            }
            TriggerEvent::Sneak => Self::new("sneak", "Moved quietly", ActionKind::Sneak),
            TriggerEvent::Spellcast { spell } => {
                Self::new("spellcast", format!("Cast {}", spell), ActionKind::Spellcast)
            }
            TriggerEvent::Custom { name, description } => {
                Self::new(name.clone(), description.clone(), ActionKind::Custom)
            }
        }
    }
}

/// A covert event with at most one alert per channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcealedAction {
    id: ActionId,
    metadata: ActionMetadata,
    aggressive: bool,
    /// Agent performing the action
    actor: EntityId,
    /// What can actually be observed; differs from the actor for thrown or
    /// shot objects
    proxy: EntityId,
    location: HexCoord,
    weapon_tier: Option<u8>,
    alerts: Vec<Alert>,
}

impl ConcealedAction {
    pub fn builder(actor: EntityId, location: HexCoord) -> ConcealedActionBuilder {
        ConcealedActionBuilder::new(actor, location)
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn metadata(&self) -> &ActionMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn kind(&self) -> ActionKind {
        self.metadata.kind
    }

    pub fn is_aggressive(&self) -> bool {
        self.aggressive
    }

    pub fn actor(&self) -> EntityId {
        self.actor
    }

    pub fn proxy(&self) -> EntityId {
        self.proxy
    }

    pub fn location(&self) -> HexCoord {
        self.location
    }

    pub fn weapon_tier(&self) -> Option<u8> {
        self.weapon_tier
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn alerts_mut(&mut self) -> impl Iterator<Item = &mut Alert> {
        self.alerts.iter_mut()
    }

    pub fn alert(&self, channel: SenseChannel) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.channel() == channel)
    }

    pub fn alert_mut(&mut self, channel: SenseChannel) -> Option<&mut Alert> {
        self.alerts.iter_mut().find(|a| a.channel() == channel)
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Source every alert of this action reports from
    pub fn source(&self) -> SourceContext {
        if self.proxy == self.actor {
            SourceContext::fixed(self.location)
        } else {
            SourceContext::tracked(self.location, self.proxy)
        }
    }

    /// Replace the alert set with the defaults for this action's kind
    pub fn initialize(&mut self) -> Result<()> {
        self.alerts.clear();
        for &(channel, intensity) in self.metadata.kind.default_alerts() {
            self.add_alert(channel, intensity)?;
        }
        Ok(())
    }

    /// Run post-processing policies in order
    pub fn configure(&mut self, policies: &[&dyn ActionPolicy]) {
        for policy in policies {
            policy.configure(self);
        }
    }

    /// Add a signal on `channel`. An existing alert on the same channel
    /// absorbs the intensity instead of being duplicated.
    pub fn add_alert(&mut self, channel: SenseChannel, intensity: u32) -> Result<()> {
        let delta = i32::try_from(intensity).unwrap_or(i32::MAX);
        if let Some(existing) = self.alert_mut(channel) {
            existing.adjust_intensity(delta);
            return Ok(());
        }
        let alert = self.build_alert(channel, intensity)?;
        self.alerts.push(alert);
        Ok(())
    }

    /// Set the alert on `channel`, discarding any previous one
    pub fn replace_alert(&mut self, channel: SenseChannel, intensity: u32) -> Result<()> {
        let alert = self.build_alert(channel, intensity)?;
        match self.alerts.iter_mut().find(|a| a.is_same(&alert)) {
            Some(slot) => *slot = alert,
            None => self.alerts.push(alert),
        }
        Ok(())
    }

    pub fn remove_alert(&mut self, channel: SenseChannel) -> Option<Alert> {
        let index = self.alerts.iter().position(|a| a.channel() == channel)?;
        Some(self.alerts.remove(index))
    }

    /// Move the event (e.g. the actor stepped before resolution); alerts follow
    pub fn relocate(&mut self, location: HexCoord) {
        self.location = location;
        let source = self.source();
        for alert in &mut self.alerts {
            alert.retarget(source);
        }
    }

    fn build_alert(&self, channel: SenseChannel, intensity: u32) -> Result<Alert> {
        Alert::builder(channel)
            .intensity(intensity)
            .parent(self.id)
            .source(self.source())
            .build()
    }
}

/// Builder for [`ConcealedAction`]
#[derive(Debug, Clone)]
pub struct ConcealedActionBuilder {
    actor: EntityId,
    location: HexCoord,
    metadata: Option<ActionMetadata>,
    aggressive: Option<bool>,
    proxy: Option<EntityId>,
    weapon_tier: Option<u8>,
    initialize: bool,
}

impl ConcealedActionBuilder {
    pub fn new(actor: EntityId, location: HexCoord) -> Self {
        Self {
            actor,
            location,
            metadata: None,
            aggressive: None,
            proxy: None,
            weapon_tier: None,
            initialize: true,
        }
    }

    /// Derive metadata, weapon tier and proxy from a host event
    pub fn event(mut self, event: &TriggerEvent) -> Self {
        self.metadata = Some(ActionMetadata::from_event(event));
        match event {
            TriggerEvent::MeleeStrike { weapon_tier } => self.weapon_tier = *weapon_tier,
            TriggerEvent::RangedShot {
                weapon_tier,
                projectile,
            } => {
                self.weapon_tier = *weapon_tier;
                if projectile.is_some() {
                    self.proxy = *projectile;
                }
            }
            _ => {}
        }
        self
    }

    pub fn metadata(mut self, metadata: ActionMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn aggressive(mut self, aggressive: bool) -> Self {
        self.aggressive = Some(aggressive);
        self
    }

    pub fn proxy(mut self, proxy: EntityId) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn weapon_tier(mut self, tier: u8) -> Self {
        self.weapon_tier = Some(tier);
        self
    }

    /// Start with no alerts instead of the kind's defaults
    pub fn without_alerts(mut self) -> Self {
        self.initialize = false;
        self
    }

    pub fn build(self) -> Result<ConcealedAction> {
        let metadata = self.metadata.ok_or_else(|| {
            DetectionError::Configuration(
                "concealed action needs metadata or a trigger event".into(),
            )
        })?;

        let mut action = ConcealedAction {
            id: ActionId::new(),
            aggressive: self.aggressive.unwrap_or_else(|| metadata.kind.is_aggressive()),
            metadata,
            actor: self.actor,
            proxy: self.proxy.unwrap_or(self.actor),
            location: self.location,
            weapon_tier: self.weapon_tier,
            alerts: Vec::new(),
        };
        if self.initialize {
            action.initialize()?;
        }
        Ok(action)
    }
}
