//! Reference hex map with terrain, line of sight and reach queries
//!
//! Hosts with their own world model implement [`Geometry`] directly; this map
//! is what the demo and the tests run against.

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::types::RegionId;
use crate::world::geometry::Geometry;
use crate::world::hex::HexCoord;
use crate::world::pathfinding::find_path;
use crate::world::terrain::Terrain;

/// A single cell on the map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub coord: HexCoord,
    pub terrain: Terrain,
}

impl Cell {
    pub fn new(coord: HexCoord, terrain: Terrain) -> Self {
        Self { coord, terrain }
    }
}

/// The full map for one region
#[derive(Debug, Clone)]
pub struct HexMap {
    pub region: RegionId,
    pub width: u32,
    pub height: u32,
    cells: AHashMap<HexCoord, Cell>,
    /// Bumped on every terrain change
    revision: u64,
}

impl HexMap {
    /// Create a new map with open terrain
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_region(RegionId::new(0), width, height)
    }

    pub fn with_region(region: RegionId, width: u32, height: u32) -> Self {
        let mut cells = AHashMap::new();
        for q in 0..width as i32 {
            for r in 0..height as i32 {
                let coord = HexCoord::new(q, r);
                cells.insert(coord, Cell::new(coord, Terrain::Open));
            }
        }

        Self {
            region,
            width,
            height,
            cells,
            revision: 0,
        }
    }

    pub fn get_cell(&self, coord: HexCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    pub fn is_passable(&self, coord: HexCoord) -> bool {
        self.get_cell(coord).is_some_and(|c| c.terrain.is_passable())
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Set terrain at a coordinate
    pub fn set_terrain(&mut self, coord: HexCoord, terrain: Terrain) {
        if let Some(cell) = self.cells.get_mut(&coord) {
            if cell.terrain != terrain {
                cell.terrain = terrain;
                self.revision += 1;
            }
        }
    }

    /// Check line of sight between two cells
    pub fn has_line_of_sight(&self, from: HexCoord, to: HexCoord) -> bool {
        let line = from.line_to(&to);

        // Endpoints never block their own sight line
        for coord in line.iter().skip(1).take(line.len().saturating_sub(2)) {
            if let Some(cell) = self.get_cell(*coord) {
                if cell.terrain.blocks_los() {
                    return false;
                }
            }
        }

        true
    }
}

impl Geometry for HexMap {
    fn line_of_sight(&self, from: HexCoord, to: HexCoord) -> bool {
        self.has_line_of_sight(from, to)
    }

    fn flood_fill(&self, origin: HexCoord, hops: u32, require_los: bool) -> AHashSet<HexCoord> {
        let mut reached = AHashSet::new();
        reached.insert(origin);

        let mut frontier = VecDeque::new();
        frontier.push_back((origin, 0u32));

        while let Some((coord, depth)) = frontier.pop_front() {
            if depth >= hops {
                continue;
            }
            for neighbor in coord.neighbors() {
                if reached.contains(&neighbor) || !self.is_passable(neighbor) {
                    continue;
                }
                reached.insert(neighbor);
                frontier.push_back((neighbor, depth + 1));
            }
        }

        if require_los {
            reached.retain(|coord| *coord == origin || self.has_line_of_sight(origin, *coord));
        }
        reached
    }

    fn path_cost(&self, from: HexCoord, to: HexCoord, budget: u32) -> Option<u32> {
        find_path(self, from, to, Some(budget)).map(|(_, cost)| cost)
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_creation() {
        let map = HexMap::new(10, 10);
        assert_eq!(map.width, 10);
        assert_eq!(map.height, 10);
        assert!(map.get_cell(HexCoord::new(5, 5)).is_some());
        assert!(map.get_cell(HexCoord::new(100, 100)).is_none());
    }

    #[test]
    fn test_line_of_sight_open() {
        let map = HexMap::new(10, 10);
        assert!(map.has_line_of_sight(HexCoord::new(0, 0), HexCoord::new(5, 0)));
    }

    #[test]
    fn test_line_of_sight_blocked_by_wall() {
        let mut map = HexMap::new(10, 10);
        map.set_terrain(HexCoord::new(2, 0), Terrain::Wall);
        assert!(!map.has_line_of_sight(HexCoord::new(0, 0), HexCoord::new(5, 0)));
    }

    #[test]
    fn test_blocker_at_endpoint_does_not_block() {
        let mut map = HexMap::new(10, 10);
        map.set_terrain(HexCoord::new(5, 0), Terrain::Door);
        assert!(map.has_line_of_sight(HexCoord::new(0, 0), HexCoord::new(5, 0)));
    }

    #[test]
    fn test_revision_bumps_on_change_only() {
        let mut map = HexMap::new(5, 5);
        assert_eq!(map.revision(), 0);
        map.set_terrain(HexCoord::new(1, 1), Terrain::Wall);
        assert_eq!(map.revision(), 1);
        map.set_terrain(HexCoord::new(1, 1), Terrain::Wall);
        assert_eq!(map.revision(), 1);
        map.set_terrain(HexCoord::new(50, 50), Terrain::Forest);
        assert_eq!(map.revision(), 1);
    }

    #[test]
    fn test_flood_fill_hops() {
        let map = HexMap::new(20, 20);
        let origin = HexCoord::new(10, 10);
        assert_eq!(map.flood_fill(origin, 0, false).len(), 1);
        assert_eq!(map.flood_fill(origin, 1, false).len(), 7);
        assert_eq!(map.flood_fill(origin, 2, false).len(), 19);
    }

    #[test]
    fn test_flood_fill_stops_at_walls() {
        let mut map = HexMap::new(20, 20);
        let origin = HexCoord::new(10, 10);
        for n in origin.neighbors() {
            map.set_terrain(n, Terrain::Wall);
        }
        let filled = map.flood_fill(origin, 5, false);
        assert_eq!(filled.len(), 1);
        assert!(filled.contains(&origin));
    }

    #[test]
    fn test_flood_fill_los_filter() {
        let mut map = HexMap::new(20, 20);
        let origin = HexCoord::new(5, 5);
        // Door is passable but opaque
        map.set_terrain(HexCoord::new(6, 5), Terrain::Door);

        let open = map.flood_fill(origin, 3, false);
        let sighted = map.flood_fill(origin, 3, true);
        assert!(open.contains(&HexCoord::new(7, 5)));
        assert!(!sighted.contains(&HexCoord::new(7, 5)));
        // The door itself is still seen
        assert!(sighted.contains(&HexCoord::new(6, 5)));
    }

    #[test]
    fn test_geometry_path_cost() {
        let map = HexMap::new(10, 10);
        let cost = map.path_cost(HexCoord::new(0, 0), HexCoord::new(3, 0), 1000);
        assert_eq!(cost, Some(300));
        assert_eq!(map.path_cost(HexCoord::new(0, 0), HexCoord::new(3, 0), 299), None);
    }
}
