//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for agents and tracked objects (projectiles, thrown items)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a concealed action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub Uuid);

impl ActionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulation tick counter
pub type Tick = u64;

/// Identifier for a live simulation region (map, zone)
///
/// Two agents can only perceive each other when they share a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionId(pub u32);

impl RegionId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_unique() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_entity_id_hash() {
        use std::collections::HashMap;
        let id = EntityId::new();
        let mut map: HashMap<EntityId, &str> = HashMap::new();
        map.insert(id, "watcher");
        assert_eq!(map.get(&id), Some(&"watcher"));
    }

    #[test]
    fn test_region_id_equality() {
        assert_eq!(RegionId::new(1), RegionId(1));
        assert_ne!(RegionId::new(1), RegionId::new(2));
    }

    #[test]
    fn test_action_id_roundtrip_json() {
        let id = ActionId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: ActionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
