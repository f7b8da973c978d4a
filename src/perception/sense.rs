//! A single perceptive sense owned by an agent

use serde::{Deserialize, Serialize};

use crate::core::config::ChannelProfile;
use crate::core::dice::RandomProvider;
use crate::core::types::EntityId;
use crate::perception::awareness::AwarenessLevel;
use crate::perception::diffuser::Diffuser;
use crate::perception::purview::{Purview, MAX_REACH};
use crate::stealth::channel::SenseChannel;
use crate::world::agent::AgentSnapshot;
use crate::world::geometry::Geometry;
use crate::world::hex::HexCoord;

pub const MAX_SCORE: u8 = 100;

/// Score lost per hex past the radius grows as `ceil(ceil(2.5^n)^1.25)`
const TAPER_BASE: f64 = 2.5;
const TAPER_EXPONENT: f64 = 1.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perception {
    owner: EntityId,
    channel: SenseChannel,
    base_score: u8,
    base_radius: u8,
    tapers: bool,
    purview: Purview,
    #[serde(skip)]
    cached_rating: Option<i32>,
}

impl Perception {
    /// Perception shaped by the channel's built-in profile
    pub fn new(owner: EntityId, channel: SenseChannel, score: i32, radius: i32) -> Self {
        Self::from_profile(owner, &ChannelProfile::builtin(channel), score, radius)
    }

    /// Tapering senses fade out with distance and so reach as far as any
    /// purview can; the rest stop hard at their radius.
    pub fn from_profile(
        owner: EntityId,
        profile: &ChannelProfile,
        score: i32,
        radius: i32,
    ) -> Self {
        let base_radius = radius.clamp(0, i32::from(MAX_REACH)) as u8;
        let reach = if profile.tapers { MAX_REACH } else { base_radius };
        let mut purview =
            Purview::new(i32::from(reach), profile.shape).with_occludes(profile.occludes);
        if let Some(kind) = profile.diffuser {
            purview = purview.with_diffuser(Diffuser::new(kind));
        }

        Self {
            owner,
            channel: profile.channel,
            base_score: score.clamp(0, i32::from(MAX_SCORE)) as u8,
            base_radius,
            tapers: profile.tapers,
            purview,
            cached_rating: None,
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn channel(&self) -> SenseChannel {
        self.channel
    }

    pub fn base_score(&self) -> u8 {
        self.base_score
    }

    pub fn base_radius(&self) -> u8 {
        self.base_radius
    }

    pub fn occludes(&self) -> bool {
        self.purview.occludes()
    }

    pub fn tapers(&self) -> bool {
        self.tapers
    }

    pub fn purview(&self) -> &Purview {
        &self.purview
    }

    pub fn purview_mut(&mut self) -> &mut Purview {
        &mut self.purview
    }

    /// Last rating produced by [`Perception::roll`]
    pub fn cached_rating(&self) -> Option<i32> {
        self.cached_rating
    }

    pub fn set_base_score(&mut self, score: i32) {
        self.base_score = score.clamp(0, i32::from(MAX_SCORE)) as u8;
    }

    /// Non-tapering senses also move their purview reach
    pub fn set_base_radius(&mut self, radius: i32) {
        self.base_radius = radius.clamp(0, i32::from(MAX_REACH)) as u8;
        if !self.tapers {
            self.purview.set_value(i32::from(self.base_radius));
        }
    }

    /// Override the purview reach independently of the radius
    pub fn set_reach(&mut self, reach: i32) {
        self.purview.set_value(reach);
    }

    pub fn set_occludes(&mut self, occludes: bool) {
        self.purview.set_occludes(occludes);
    }

    pub fn set_tapers(&mut self, tapers: bool) {
        self.tapers = tapers;
    }

    /// The owner can use this sense at all
    pub fn validate(&self, owner: &AgentSnapshot) -> bool {
        owner.id == self.owner
            && owner.alive
            && self
                .channel
                .required_organ()
                .map_or(true, |organ| owner.has_organ(organ))
    }

    /// Score at `distance`, reduced steeply past the base radius
    pub fn taper(&self, distance: u32) -> i32 {
        let base = i32::from(self.base_score);
        let radius = u32::from(self.base_radius);
        if !self.tapers || distance <= radius {
            return base;
        }
        let excess = (distance - radius).min(i32::MAX as u32) as i32;
        let penalty = TAPER_BASE.powi(excess).ceil().powf(TAPER_EXPONENT).ceil();
        // Float-to-int casts saturate
        base.saturating_sub(penalty as i32)
    }

    /// Whether `location` falls inside the purview as seen by the owner
    pub fn in_purview(
        &mut self,
        perceiver: &AgentSnapshot,
        location: HexCoord,
        geometry: &dyn Geometry,
    ) -> bool {
        match perceiver.location {
            Some(origin) => self.purview.is_within(origin, location, geometry),
            None => false,
        }
    }

    /// Open-ended perception roll against the target where it stands
    pub fn roll(
        &mut self,
        perceiver: &AgentSnapshot,
        target: &AgentSnapshot,
        geometry: &dyn Geometry,
        dice: &mut dyn RandomProvider,
    ) -> i32 {
        self.roll_at(perceiver, target, target.location, geometry, dice)
    }

    /// Open-ended perception roll toward a specific location.
    ///
    /// The distance-tapered score applies only when both agents are live in
    /// the same region and the location is inside the purview; otherwise
    /// the untapered base score is rolled.
    pub fn roll_at(
        &mut self,
        perceiver: &AgentSnapshot,
        target: &AgentSnapshot,
        location: Option<HexCoord>,
        geometry: &dyn Geometry,
        dice: &mut dyn RandomProvider,
    ) -> i32 {
        let score = match (perceiver.location, location) {
            (Some(origin), Some(location))
                if perceiver.shares_context(target)
                    && self.purview.is_within(origin, location, geometry) =>
            {
                self.taper(geometry.distance(origin, location))
            }
            _ => i32::from(self.base_score),
        };

        let rating = dice.open_ended(score.max(1));
        self.cached_rating = Some(rating);
        rating
    }

    pub fn awareness(&self, roll: i32) -> AwarenessLevel {
        AwarenessLevel::from_roll(roll)
    }

    /// Roll and band in one step
    pub fn get_awareness(
        &mut self,
        perceiver: &AgentSnapshot,
        target: &AgentSnapshot,
        geometry: &dyn Geometry,
        dice: &mut dyn RandomProvider,
    ) -> AwarenessLevel {
        let roll = self.roll(perceiver, target, geometry, dice);
        self.awareness(roll)
    }

    /// Drop the cached rating and any memoized purview area
    pub fn invalidate(&mut self) {
        self.cached_rating = None;
        self.purview.invalidate();
    }
}
