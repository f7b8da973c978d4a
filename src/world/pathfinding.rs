//! A* path cost for hex maps
//!
//! Respects terrain costs and an optional cost budget. Costs use the x100
//! scale from [`crate::world::terrain`].

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;

use crate::world::hex::HexCoord;
use crate::world::map::HexMap;

/// Cheapest per-cell cost on any terrain, keeps the heuristic admissible
const MIN_STEP_COST: u32 = 70;

/// Node in the A* open set
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathNode {
    coord: HexCoord,
    f_cost: u32, // g_cost + heuristic
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; coord breaks ties deterministically
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(from: HexCoord, goal: HexCoord) -> u32 {
    from.distance(&goal) * MIN_STEP_COST
}

/// Find the cheapest path using A*
///
/// Returns the path (start and goal inclusive) and its total cost, or None if
/// no path exists. Paths whose cost would exceed `budget` are not explored.
pub fn find_path(
    map: &HexMap,
    start: HexCoord,
    goal: HexCoord,
    budget: Option<u32>,
) -> Option<(Vec<HexCoord>, u32)> {
    if start == goal {
        return Some((vec![start], 0));
    }
    if !map.is_passable(goal) {
        return None;
    }

    let limit = budget.unwrap_or(u32::MAX);
    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<HexCoord, HexCoord> = AHashMap::new();
    let mut g_scores: AHashMap<HexCoord, u32> = AHashMap::new();

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        coord: start,
        f_cost: heuristic(start, goal),
    });

    while let Some(current) = open_set.pop() {
        let current_g = g_scores.get(&current.coord).copied().unwrap_or(u32::MAX);

        if current.coord == goal {
            return Some((reconstruct_path(&came_from, current.coord), current_g));
        }

        for neighbor in current.coord.neighbors() {
            let Some(step) = map.get_cell(neighbor).and_then(|c| c.terrain.movement_cost()) else {
                continue;
            };

            let tentative_g = current_g.saturating_add(step);
            if tentative_g > limit {
                continue;
            }

            let neighbor_g = g_scores.get(&neighbor).copied().unwrap_or(u32::MAX);
            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.coord);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    coord: neighbor,
                    f_cost: tentative_g.saturating_add(heuristic(neighbor, goal)),
                });
            }
        }
    }

    None
}

/// Reconstruct path from came_from map
fn reconstruct_path(
    came_from: &AHashMap<HexCoord, HexCoord>,
    mut current: HexCoord,
) -> Vec<HexCoord> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::terrain::Terrain;

    #[test]
    fn test_pathfind_straight_line() {
        let map = HexMap::new(10, 10);
        let start = HexCoord::new(0, 0);
        let goal = HexCoord::new(5, 0);

        let (path, cost) = find_path(&map, start, goal, None).unwrap();
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(cost, 500);
    }

    #[test]
    fn test_pathfind_around_obstacle() {
        let mut map = HexMap::new(10, 10);
        map.set_terrain(HexCoord::new(2, 0), Terrain::Wall);
        map.set_terrain(HexCoord::new(3, 0), Terrain::Wall);

        let (path, cost) = find_path(&map, HexCoord::new(0, 0), HexCoord::new(5, 0), None).unwrap();
        assert!(!path.contains(&HexCoord::new(2, 0)));
        assert!(cost > 500);
    }

    #[test]
    fn test_pathfind_no_path() {
        let mut map = HexMap::new(10, 10);
        let goal = HexCoord::new(5, 5);
        for neighbor in goal.neighbors() {
            map.set_terrain(neighbor, Terrain::Wall);
        }

        assert!(find_path(&map, HexCoord::new(0, 0), goal, None).is_none());
    }

    #[test]
    fn test_pathfind_respects_budget() {
        let map = HexMap::new(10, 10);
        let start = HexCoord::new(0, 0);
        let goal = HexCoord::new(4, 0);

        assert!(find_path(&map, start, goal, Some(400)).is_some());
        assert!(find_path(&map, start, goal, Some(399)).is_none());
    }

    #[test]
    fn test_pathfind_same_start_goal() {
        let map = HexMap::new(10, 10);
        let start = HexCoord::new(5, 5);
        let (path, cost) = find_path(&map, start, start, Some(0)).unwrap();
        assert_eq!(path, vec![start]);
        assert_eq!(cost, 0);
    }

    #[test]
    fn test_pathfind_prefers_road() {
        let mut map = HexMap::new(10, 10);
        for q in 0..10 {
            map.set_terrain(HexCoord::new(q, 1), Terrain::Road);
        }
        for q in 1..5 {
            map.set_terrain(HexCoord::new(q, 0), Terrain::Forest);
        }

        let (_, cost) = find_path(&map, HexCoord::new(0, 0), HexCoord::new(5, 0), None).unwrap();
        // Straight through forest would be 4 * 250 + 100 = 1100
        assert!(cost < 1100);
    }
}
