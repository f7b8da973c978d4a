//! Host-side view of an agent at resolution time
//!
//! The engine reads agents through snapshots taken by the host at the start
//! of a tick. A snapshot with no location or region is not live and cannot
//! take part in a detection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, RegionId};
use crate::stealth::channel::SenseChannel;
use crate::world::hex::HexCoord;

/// Sensory organ a channel may require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Organ {
    Eyes,
    Ears,
    Nose,
    Skin,
    Mind,
}

impl Organ {
    pub fn all() -> [Organ; 5] {
        [Organ::Eyes, Organ::Ears, Organ::Nose, Organ::Skin, Organ::Mind]
    }
}

/// How hard an agent is to notice, per channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcealmentProfile {
    /// Relevant stat modifier added to every save difficulty against this agent
    pub stat_modifier: i32,
    /// Per-channel concealment rating (the "alert rating" of a save)
    pub ratings: BTreeMap<SenseChannel, i32>,
}

impl ConcealmentProfile {
    pub fn new(stat_modifier: i32) -> Self {
        Self {
            stat_modifier,
            ratings: BTreeMap::new(),
        }
    }

    pub fn with_rating(mut self, channel: SenseChannel, rating: i32) -> Self {
        self.ratings.insert(channel, rating);
        self
    }

    pub fn rating(&self, channel: SenseChannel) -> i32 {
        self.ratings.get(&channel).copied().unwrap_or(0)
    }
}

/// An agent as seen by the detection engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: EntityId,
    pub location: Option<HexCoord>,
    pub region: Option<RegionId>,
    pub alive: bool,
    pub organs: Vec<Organ>,
    pub concealment: ConcealmentProfile,
}

impl AgentSnapshot {
    /// A live agent with every organ and no concealment
    pub fn new(id: EntityId, region: RegionId, location: HexCoord) -> Self {
        Self {
            id,
            location: Some(location),
            region: Some(region),
            alive: true,
            organs: Organ::all().to_vec(),
            concealment: ConcealmentProfile::default(),
        }
    }

    pub fn with_organs(mut self, organs: &[Organ]) -> Self {
        self.organs = organs.to_vec();
        self
    }

    pub fn with_concealment(mut self, concealment: ConcealmentProfile) -> Self {
        self.concealment = concealment;
        self
    }

    pub fn has_organ(&self, organ: Organ) -> bool {
        self.organs.contains(&organ)
    }

    /// Alive and placed somewhere in a live region
    pub fn is_live(&self) -> bool {
        self.alive && self.location.is_some() && self.region.is_some()
    }

    /// Both agents are live and in the same region
    pub fn shares_context(&self, other: &AgentSnapshot) -> bool {
        self.is_live() && other.is_live() && self.region == other.region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_at(q: i32, r: i32) -> AgentSnapshot {
        AgentSnapshot::new(EntityId::new(), RegionId::new(1), HexCoord::new(q, r))
    }

    #[test]
    fn test_new_agent_is_live() {
        let agent = agent_at(0, 0);
        assert!(agent.is_live());
        assert!(agent.has_organ(Organ::Eyes));
    }

    #[test]
    fn test_dead_agent_not_live() {
        let mut agent = agent_at(0, 0);
        agent.alive = false;
        assert!(!agent.is_live());
    }

    #[test]
    fn test_removed_agent_not_live() {
        let mut agent = agent_at(0, 0);
        agent.location = None;
        assert!(!agent.is_live());
    }

    #[test]
    fn test_shares_context_requires_same_region() {
        let a = agent_at(0, 0);
        let mut b = agent_at(3, 0);
        assert!(a.shares_context(&b));
        b.region = Some(RegionId::new(2));
        assert!(!a.shares_context(&b));
    }

    #[test]
    fn test_concealment_rating_defaults_to_zero() {
        let profile = ConcealmentProfile::new(2).with_rating(SenseChannel::Visual, 4);
        assert_eq!(profile.rating(SenseChannel::Visual), 4);
        assert_eq!(profile.rating(SenseChannel::Auditory), 0);
        assert_eq!(profile.stat_modifier, 2);
    }

    #[test]
    fn test_blind_agent() {
        let agent = agent_at(0, 0).with_organs(&[Organ::Ears, Organ::Skin]);
        assert!(!agent.has_organ(Organ::Eyes));
        assert!(agent.has_organ(Organ::Ears));
    }
}
