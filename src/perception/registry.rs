//! Every sense an agent holds, one per channel

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::dice::RandomProvider;
use crate::core::error::{DetectionError, Result};
use crate::core::types::EntityId;
use crate::perception::awareness::AwarenessLevel;
use crate::perception::sense::Perception;
use crate::stealth::channel::SenseChannel;
use crate::world::agent::AgentSnapshot;
use crate::world::geometry::Geometry;

/// What happens when a second perception arrives for a held channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// The newcomer replaces the held perception
    #[default]
    Override,
    /// The newcomer is refused with [`DetectionError::DuplicateChannel`]
    Reject,
}

/// Winning perception of a best-of roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestRoll {
    pub channel: SenseChannel,
    pub rating: i32,
    pub level: AwarenessLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerceptionSet {
    owner: EntityId,
    policy: DuplicatePolicy,
    perceptions: Vec<Perception>,
    version: u64,
    /// Geometry revision the memoized areas were built against
    #[serde(skip)]
    seen_revision: Option<u64>,
    #[serde(skip)]
    cache: AHashMap<(EntityId, u64), BestRoll>,
}

impl PerceptionSet {
    pub fn new(owner: EntityId, policy: DuplicatePolicy) -> Self {
        Self {
            owner,
            policy,
            perceptions: Vec::new(),
            version: 0,
            seen_revision: None,
            cache: AHashMap::new(),
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Bumped by every mutation; cached rolls are only valid for one version
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.perceptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perceptions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Perception> {
        self.perceptions.iter()
    }

    pub fn channels(&self) -> impl Iterator<Item = SenseChannel> + '_ {
        self.perceptions.iter().map(Perception::channel)
    }

    pub fn contains(&self, channel: SenseChannel) -> bool {
        self.get(channel).is_some()
    }

    pub fn get(&self, channel: SenseChannel) -> Option<&Perception> {
        self.perceptions.iter().find(|p| p.channel() == channel)
    }

    /// Mutable access counts as a mutation
    pub fn get_mut(&mut self, channel: SenseChannel) -> Option<&mut Perception> {
        self.touch();
        self.slot_mut(channel)
    }

    /// Add a perception. Under `Override` the displaced one is returned.
    pub fn add(&mut self, perception: Perception) -> Result<Option<Perception>> {
        let channel = perception.channel();
        let displaced = match self.perceptions.iter().position(|p| p.channel() == channel) {
            Some(_) if self.policy == DuplicatePolicy::Reject => {
                return Err(DetectionError::DuplicateChannel(channel));
            }
            Some(index) => Some(std::mem::replace(&mut self.perceptions[index], perception)),
            None => {
                self.perceptions.push(perception);
                None
            }
        };
        self.touch();
        Ok(displaced)
    }

    pub fn remove(&mut self, channel: SenseChannel) -> Option<Perception> {
        let index = self.perceptions.iter().position(|p| p.channel() == channel)?;
        self.touch();
        Some(self.perceptions.remove(index))
    }

    pub fn clear(&mut self) {
        self.perceptions.clear();
        self.touch();
    }

    /// Forget memoized purview areas after the map changed
    pub fn invalidate_geometry(&mut self) {
        for perception in &mut self.perceptions {
            perception.invalidate();
        }
        self.touch();
    }

    /// Drop geometry caches when `revision` differs from the last one seen.
    ///
    /// The first revision observed is only recorded. Returns whether the
    /// caches were dropped.
    pub fn sync_geometry(&mut self, revision: u64) -> bool {
        let stale = self.seen_revision.is_some_and(|seen| seen != revision);
        if stale {
            tracing::debug!(
                owner = ?self.owner,
                revision,
                "geometry changed, dropping purview caches"
            );
            self.invalidate_geometry();
        }
        self.seen_revision = Some(revision);
        stale
    }

    /// Best roll across every usable perception against `target`.
    ///
    /// Ties keep the first perception added. Repeated calls for the same
    /// target return the cached result until the set is mutated.
    pub fn roll(
        &mut self,
        perceiver: &AgentSnapshot,
        target: &AgentSnapshot,
        geometry: &dyn Geometry,
        dice: &mut dyn RandomProvider,
    ) -> Option<BestRoll> {
        self.sync_geometry(geometry.revision());
        let key = (target.id, self.version);
        if let Some(best) = self.cache.get(&key) {
            return Some(*best);
        }

        let mut best: Option<BestRoll> = None;
        for perception in &mut self.perceptions {
            if !perception.validate(perceiver) {
                continue;
            }
            let rating = perception.roll(perceiver, target, geometry, dice);
            if best.map_or(true, |current| rating > current.rating) {
                best = Some(BestRoll {
                    channel: perception.channel(),
                    rating,
                    level: perception.awareness(rating),
                });
            }
        }

        if let Some(found) = best {
            tracing::trace!(
                target = ?target.id,
                channel = ?found.channel,
                rating = found.rating,
                "best perception roll"
            );
            self.cache.insert(key, found);
        }
        best
    }

    pub fn awareness(
        &mut self,
        perceiver: &AgentSnapshot,
        target: &AgentSnapshot,
        geometry: &dyn Geometry,
        dice: &mut dyn RandomProvider,
    ) -> AwarenessLevel {
        self.roll(perceiver, target, geometry, dice)
            .map_or(AwarenessLevel::None, |best| best.level)
    }

    /// Per-roll access during resolution; rolling only refreshes caches
    pub(crate) fn slot_mut(&mut self, channel: SenseChannel) -> Option<&mut Perception> {
        self.perceptions.iter_mut().find(|p| p.channel() == channel)
    }

    fn touch(&mut self) {
        self.version += 1;
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::RegionId;
    use crate::perception::purview::PurviewShape;
    use crate::world::agent::Organ;
    use crate::world::hex::HexCoord;
    use crate::world::map::HexMap;
    use crate::world::terrain::Terrain;

    fn agent_at(q: i32, r: i32) -> AgentSnapshot {
        AgentSnapshot::new(EntityId::new(), RegionId::new(0), HexCoord::new(q, r))
    }

    #[test]
    fn test_override_replaces() {
        let owner = EntityId::new();
        let mut set = PerceptionSet::new(owner, DuplicatePolicy::Override);
        assert!(set.add(Perception::new(owner, SenseChannel::Visual, 20, 5)).unwrap().is_none());
        let displaced = set
            .add(Perception::new(owner, SenseChannel::Visual, 70, 5))
            .unwrap()
            .unwrap();
        assert_eq!(displaced.base_score(), 20);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(SenseChannel::Visual).unwrap().base_score(), 70);
    }

    #[test]
    fn test_reject_refuses_duplicate() {
        let owner = EntityId::new();
        let mut set = PerceptionSet::new(owner, DuplicatePolicy::Reject);
        set.add(Perception::new(owner, SenseChannel::Auditory, 20, 5)).unwrap();
        let result = set.add(Perception::new(owner, SenseChannel::Auditory, 70, 5));
        assert!(matches!(
            result,
            Err(DetectionError::DuplicateChannel(SenseChannel::Auditory))
        ));
        assert_eq!(set.get(SenseChannel::Auditory).unwrap().base_score(), 20);
    }

    #[test]
    fn test_mutations_bump_version() {
        let owner = EntityId::new();
        let mut set = PerceptionSet::new(owner, DuplicatePolicy::Override);
        let v0 = set.version();
        set.add(Perception::new(owner, SenseChannel::Visual, 20, 5)).unwrap();
        let v1 = set.version();
        assert!(v1 > v0);
        set.get_mut(SenseChannel::Visual).unwrap().set_base_score(30);
        let v2 = set.version();
        assert!(v2 > v1);
        set.remove(SenseChannel::Visual);
        assert!(set.version() > v2);
        let v3 = set.version();
        set.clear();
        assert!(set.version() > v3);
        // Removing something absent is not a mutation
        let v4 = set.version();
        assert!(set.remove(SenseChannel::Psionic).is_none());
        assert_eq!(set.version(), v4);
    }

    #[test]
    fn test_best_roll_and_cache() {
        let map = HexMap::new(10, 10);
        let watcher = agent_at(1, 1);
        let target = agent_at(2, 1);
        let mut set = PerceptionSet::new(watcher.id, DuplicatePolicy::Override);
        set.add(Perception::new(watcher.id, SenseChannel::Visual, 100, 5)).unwrap();
        set.add(Perception::new(watcher.id, SenseChannel::Auditory, 100, 5)).unwrap();

        let mut dice = ScriptedDice::new([30, 65]);
        let best = set.roll(&watcher, &target, &map, &mut dice).unwrap();
        assert_eq!(best.channel, SenseChannel::Auditory);
        assert_eq!(best.rating, 65);
        assert_eq!(best.level, AwarenessLevel::Aware);

        // Cached: no further draws needed and the same answer comes back
        let again = set.roll(&watcher, &target, &map, &mut dice).unwrap();
        assert_eq!(again, best);
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn test_tie_keeps_first_added() {
        let map = HexMap::new(10, 10);
        let watcher = agent_at(1, 1);
        let target = agent_at(2, 1);
        let mut set = PerceptionSet::new(watcher.id, DuplicatePolicy::Override);
        set.add(Perception::new(watcher.id, SenseChannel::Visual, 100, 5)).unwrap();
        set.add(Perception::new(watcher.id, SenseChannel::Auditory, 100, 5)).unwrap();

        let mut dice = ScriptedDice::new([42, 42]);
        let best = set.roll(&watcher, &target, &map, &mut dice).unwrap();
        assert_eq!(best.channel, SenseChannel::Visual);
    }

    #[test]
    fn test_mutation_drops_cache() {
        let map = HexMap::new(10, 10);
        let watcher = agent_at(1, 1);
        let target = agent_at(2, 1);
        let mut set = PerceptionSet::new(watcher.id, DuplicatePolicy::Override);
        set.add(Perception::new(watcher.id, SenseChannel::Visual, 100, 5)).unwrap();

        let mut dice = ScriptedDice::new([30, 90]);
        assert_eq!(set.roll(&watcher, &target, &map, &mut dice).unwrap().rating, 30);
        set.get_mut(SenseChannel::Visual).unwrap().set_tapers(false);
        assert_eq!(set.roll(&watcher, &target, &map, &mut dice).unwrap().rating, 90);
    }

    #[test]
    fn test_invalid_perceptions_skipped() {
        let map = HexMap::new(10, 10);
        let watcher = agent_at(1, 1).with_organs(&[Organ::Ears]);
        let target = agent_at(2, 1);
        let mut set = PerceptionSet::new(watcher.id, DuplicatePolicy::Override);
        set.add(Perception::new(watcher.id, SenseChannel::Visual, 100, 5)).unwrap();

        let mut dice = ScriptedDice::new([90]);
        assert!(set.roll(&watcher, &target, &map, &mut dice).is_none());
        assert_eq!(set.awareness(&watcher, &target, &map, &mut dice), AwarenessLevel::None);
    }

    fn area_sense(owner: EntityId) -> Perception {
        let sense = Perception::new(owner, SenseChannel::Kinesthetic, 60, 4);
        assert_eq!(sense.purview().shape(), PurviewShape::Area);
        sense
    }

    #[test]
    fn test_invalidate_geometry_recomputes_area() {
        let mut map = HexMap::new(12, 12);
        let origin = HexCoord::new(5, 5);
        let spot = HexCoord::new(7, 5);
        let owner = EntityId::new();
        let mut set = PerceptionSet::new(owner, DuplicatePolicy::Override);
        set.add(area_sense(owner)).unwrap();

        let sense = set.slot_mut(SenseChannel::Kinesthetic).unwrap();
        assert!(sense.purview_mut().is_within(origin, spot, &map));

        for neighbor in spot.neighbors() {
            map.set_terrain(neighbor, Terrain::Wall);
        }
        // Still answering from the memoized flood fill
        let sense = set.slot_mut(SenseChannel::Kinesthetic).unwrap();
        assert!(sense.purview_mut().is_within(origin, spot, &map));

        let before = set.version();
        set.invalidate_geometry();
        assert!(set.version() > before);
        let sense = set.slot_mut(SenseChannel::Kinesthetic).unwrap();
        assert!(!sense.purview_mut().is_within(origin, spot, &map));
    }

    #[test]
    fn test_sync_geometry_follows_map_revision() {
        let mut map = HexMap::new(12, 12);
        let owner = EntityId::new();
        let mut set = PerceptionSet::new(owner, DuplicatePolicy::Override);
        set.add(area_sense(owner)).unwrap();

        // First sighting only records the revision
        assert!(!set.sync_geometry(map.revision()));
        let version = set.version();
        assert!(!set.sync_geometry(map.revision()));
        assert_eq!(set.version(), version);

        map.set_terrain(HexCoord::new(6, 5), Terrain::Wall);
        assert!(set.sync_geometry(map.revision()));
        assert!(set.version() > version);
        assert!(!set.sync_geometry(map.revision()));
    }

    #[test]
    fn test_roll_sees_terrain_change() {
        let mut map = HexMap::new(12, 12);
        let watcher = agent_at(5, 5);
        let target = agent_at(7, 5);
        let mut set = PerceptionSet::new(watcher.id, DuplicatePolicy::Override);
        set.add(area_sense(watcher.id)).unwrap();

        let mut dice = ScriptedDice::new([40, 45]);
        assert_eq!(set.roll(&watcher, &target, &map, &mut dice).unwrap().rating, 40);

        // A map edit drops the cached best roll as well as the area
        map.set_terrain(HexCoord::new(1, 1), Terrain::Wall);
        assert_eq!(set.roll(&watcher, &target, &map, &mut dice).unwrap().rating, 45);
        assert_eq!(dice.remaining(), 0);
    }
}
