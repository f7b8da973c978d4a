//! Alerts: one channel's detectable signal from a concealed action

use serde::{Deserialize, Serialize};

use crate::core::error::{DetectionError, Result};
use crate::core::types::{ActionId, EntityId};
use crate::stealth::channel::SenseChannel;
use crate::world::geometry::LocationTracker;
use crate::world::hex::HexCoord;

/// Where an alert comes from
///
/// `origin` is frozen at the moment of the event. When `tracked` names an
/// entity the host still follows (a thrown bottle, a fleeing thief), the
/// alert resolves to that entity's live position once it has moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceContext {
    pub origin: HexCoord,
    pub tracked: Option<EntityId>,
}

impl SourceContext {
    pub fn fixed(origin: HexCoord) -> Self {
        Self {
            origin,
            tracked: None,
        }
    }

    pub fn tracked(origin: HexCoord, entity: EntityId) -> Self {
        Self {
            origin,
            tracked: Some(entity),
        }
    }

    /// The tracked entity has a live position that differs from the origin
    pub fn is_stale(&self, tracker: &dyn LocationTracker) -> bool {
        self.live_location(tracker)
            .is_some_and(|live| live != self.origin)
    }

    /// Live position when stale, otherwise the frozen origin
    pub fn location(&self, tracker: &dyn LocationTracker) -> HexCoord {
        match self.live_location(tracker) {
            Some(live) if live != self.origin => live,
            _ => self.origin,
        }
    }

    fn live_location(&self, tracker: &dyn LocationTracker) -> Option<HexCoord> {
        self.tracked.and_then(|id| tracker.current_location(id))
    }
}

/// One channel's signal for a single concealed action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    channel: SenseChannel,
    intensity: u32,
    parent: ActionId,
    source: SourceContext,
}

impl Alert {
    pub fn builder(channel: SenseChannel) -> AlertBuilder {
        AlertBuilder::new(channel)
    }

    pub fn channel(&self) -> SenseChannel {
        self.channel
    }

    pub fn intensity(&self) -> u32 {
        self.intensity
    }

    pub fn parent(&self) -> ActionId {
        self.parent
    }

    pub fn source(&self) -> &SourceContext {
        &self.source
    }

    /// Alerts are interchangeable when they share a channel
    pub fn is_same(&self, other: &Alert) -> bool {
        self.channel == other.channel
    }

    /// Add `delta` to the intensity, flooring at 0. Returns the new intensity.
    pub fn adjust_intensity(&mut self, delta: i32) -> u32 {
        let adjusted = (i64::from(self.intensity) + i64::from(delta)).clamp(0, i64::from(u32::MAX));
        self.intensity = adjusted as u32;
        self.intensity
    }

    pub(crate) fn retarget(&mut self, source: SourceContext) {
        self.source = source;
    }
}

/// Builder for [`Alert`]; a parent action and a source are required
#[derive(Debug, Clone)]
pub struct AlertBuilder {
    channel: SenseChannel,
    intensity: u32,
    parent: Option<ActionId>,
    source: Option<SourceContext>,
}

impl AlertBuilder {
    pub fn new(channel: SenseChannel) -> Self {
        Self {
            channel,
            intensity: 0,
            parent: None,
            source: None,
        }
    }

    pub fn intensity(mut self, intensity: u32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn parent(mut self, parent: ActionId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn source(mut self, source: SourceContext) -> Self {
        self.source = Some(source);
        self
    }

    pub fn build(self) -> Result<Alert> {
        let parent = self.parent.ok_or(DetectionError::MissingParent {
            channel: self.channel,
        })?;
        let source = self.source.ok_or_else(|| {
            DetectionError::Configuration(format!(
                "{:?} alert has no source location",
                self.channel
            ))
        })?;

        Ok(Alert {
            channel: self.channel,
            intensity: self.intensity,
            parent,
            source,
        })
    }
}
