//! Host collaborator interfaces
//!
//! The detection engine never owns the world. It asks these traits for
//! distances, sight lines, reachable areas and live entity positions.

use ahash::AHashSet;

use crate::core::types::EntityId;
use crate::world::hex::HexCoord;

/// Spatial queries the perception engine needs from the host
pub trait Geometry {
    /// Step distance between two cells
    fn distance(&self, from: HexCoord, to: HexCoord) -> u32 {
        from.distance(&to)
    }

    /// Unobstructed sight line between two cells
    fn line_of_sight(&self, from: HexCoord, to: HexCoord) -> bool;

    /// Cells reachable from `origin` in at most `hops` steps.
    ///
    /// When `require_los` is set, only cells with a sight line back to the
    /// origin are kept. The origin itself is always included.
    fn flood_fill(&self, origin: HexCoord, hops: u32, require_los: bool) -> AHashSet<HexCoord>;

    /// Cheapest path cost from `from` to `to` (x100 scale), or `None` when no
    /// path exists within `budget`.
    fn path_cost(&self, from: HexCoord, to: HexCoord, budget: u32) -> Option<u32>;

    /// Counter that changes whenever terrain affecting reach changes.
    ///
    /// Perception sets compare it against the last value they saw and drop
    /// memoized areas when it moves. Hosts that keep it at 0 must call
    /// `PerceptionSet::invalidate_geometry` themselves after editing the world.
    fn revision(&self) -> u64 {
        0
    }
}

/// Live positions of independently tracked entities
pub trait LocationTracker {
    fn current_location(&self, id: EntityId) -> Option<HexCoord>;
}

/// Tracker that knows nothing; every source falls back to its origin
#[derive(Debug, Clone, Copy, Default)]
pub struct Untracked;

impl LocationTracker for Untracked {
    fn current_location(&self, _id: EntityId) -> Option<HexCoord> {
        None
    }
}

impl LocationTracker for ahash::AHashMap<EntityId, HexCoord> {
    fn current_location(&self, id: EntityId) -> Option<HexCoord> {
        self.get(&id).copied()
    }
}
