//! Purview: how far and in what shape a perception reaches

use std::cmp::Ordering;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::perception::diffuser::Diffuser;
use crate::world::geometry::Geometry;
use crate::world::hex::HexCoord;
use crate::world::terrain::COST_SCALE;

/// Hard ceiling on any reach, adjusted or not
pub const MAX_REACH: u8 = 84;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurviewShape {
    /// Straight line out to the reach
    Line,
    /// Flood fill of passable cells out to the reach
    Area,
    /// Walkable route costing at most `reach` full steps
    Pathing,
}

/// Memoized flood fill for one origin and reach
#[derive(Debug, Clone)]
struct AreaCache {
    origin: HexCoord,
    reach: u8,
    cells: AHashSet<HexCoord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purview {
    value: u8,
    shape: PurviewShape,
    occludes: bool,
    diffuser: Option<Diffuser>,
    adjustment: i32,
    #[serde(skip)]
    area: Option<AreaCache>,
}

fn clamp_reach(value: i64) -> u8 {
    value.clamp(0, i64::from(MAX_REACH)) as u8
}

impl Purview {
    pub fn new(value: i32, shape: PurviewShape) -> Self {
        Self {
            value: clamp_reach(i64::from(value)),
            shape,
            occludes: false,
            diffuser: None,
            adjustment: 0,
            area: None,
        }
    }

    pub fn with_occludes(mut self, occludes: bool) -> Self {
        self.occludes = occludes;
        self
    }

    /// Attach an attenuation curve stretched over the effective reach
    pub fn with_diffuser(mut self, mut diffuser: Diffuser) -> Self {
        diffuser.set_steps(u32::from(self.effective_value()));
        self.diffuser = Some(diffuser);
        self
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn shape(&self) -> PurviewShape {
        self.shape
    }

    pub fn occludes(&self) -> bool {
        self.occludes
    }

    pub fn adjustment(&self) -> i32 {
        self.adjustment
    }

    pub fn diffuser(&self) -> Option<&Diffuser> {
        self.diffuser.as_ref()
    }

    pub fn is_line(&self) -> bool {
        self.shape == PurviewShape::Line
    }

    pub fn is_area(&self) -> bool {
        self.shape == PurviewShape::Area
    }

    pub fn is_pathing(&self) -> bool {
        self.shape == PurviewShape::Pathing
    }

    pub fn is_diffusing(&self) -> bool {
        self.diffuser.is_some()
    }

    /// Base reach plus adjustment, kept within `0..=MAX_REACH`
    pub fn effective_value(&self) -> u8 {
        clamp_reach(i64::from(self.value) + i64::from(self.adjustment))
    }

    pub fn set_value(&mut self, value: i32) {
        self.value = clamp_reach(i64::from(value));
        self.reach_changed();
    }

    pub fn set_occludes(&mut self, occludes: bool) {
        if self.occludes != occludes {
            self.occludes = occludes;
            self.invalidate();
        }
    }

    /// Replace the current adjustment (not cumulative)
    pub fn apply_adjustment(&mut self, adjustment: i32) {
        if self.adjustment == adjustment {
            return;
        }
        self.adjustment = adjustment;
        self.reach_changed();
    }

    /// Drop memoized areas; call when the map changes
    pub fn invalidate(&mut self) {
        self.area = None;
    }

    /// Whether `location` is covered when perceiving from `origin`
    pub fn is_within(
        &mut self,
        origin: HexCoord,
        location: HexCoord,
        geometry: &dyn Geometry,
    ) -> bool {
        let reach = self.effective_value();
        match self.shape {
            PurviewShape::Line => {
                geometry.distance(origin, location) <= u32::from(reach)
                    && (!self.occludes || geometry.line_of_sight(origin, location))
            }
            PurviewShape::Area => self.area_cells(origin, geometry).contains(&location),
            PurviewShape::Pathing => {
                let budget = u32::from(reach) * COST_SCALE;
                let reachable = geometry
                    .path_cost(origin, location, budget)
                    .is_some_and(|cost| cost <= budget);
                reachable && (!self.occludes || geometry.line_of_sight(origin, location))
            }
        }
    }

    /// Fraction of the signal retained at `distance`; 1.0 without a curve
    pub fn diffuse(&self, distance: u32) -> f64 {
        self.diffuser
            .as_ref()
            .map_or(1.0, |diffuser| diffuser.retained(distance))
    }

    fn area_cells(&mut self, origin: HexCoord, geometry: &dyn Geometry) -> &AHashSet<HexCoord> {
        let reach = self.effective_value();
        let fresh = self
            .area
            .as_ref()
            .is_some_and(|cache| cache.origin == origin && cache.reach == reach);
        if !fresh {
            self.area = None;
        }
        let occludes = self.occludes;
        let cache = self.area.get_or_insert_with(|| {
            tracing::trace!(?origin, reach, "flood filling purview area");
            AreaCache {
                origin,
                reach,
                cells: geometry.flood_fill(origin, u32::from(reach), occludes),
            }
        });
        &cache.cells
    }

    fn reach_changed(&mut self) {
        let reach = u32::from(self.effective_value());
        if let Some(diffuser) = self.diffuser.as_mut() {
            diffuser.set_steps(reach);
        }
        self.invalidate();
    }
}

impl PartialEq for Purview {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.effective_value() == other.effective_value()
    }
}

impl Eq for Purview {}

impl PartialOrd for Purview {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Purview {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| self.effective_value().cmp(&other.effective_value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::diffuser::DiffuserKind;
    use crate::world::map::HexMap;
    use crate::world::terrain::Terrain;

    fn open_map() -> HexMap {
        HexMap::new(20, 20)
    }

    #[test]
    fn test_value_clamped() {
        assert_eq!(Purview::new(200, PurviewShape::Line).value(), MAX_REACH);
        assert_eq!(Purview::new(-5, PurviewShape::Line).value(), 0);
    }

    #[test]
    fn test_effective_value_clamped() {
        let mut purview = Purview::new(80, PurviewShape::Line);
        purview.apply_adjustment(10);
        assert_eq!(purview.effective_value(), MAX_REACH);
        purview.apply_adjustment(-100);
        assert_eq!(purview.effective_value(), 0);
        assert_eq!(purview.value(), 80);
    }

    #[test]
    fn test_line_boundary_inclusive() {
        let map = open_map();
        let mut purview = Purview::new(5, PurviewShape::Line);
        let origin = HexCoord::new(2, 2);
        assert!(purview.is_within(origin, HexCoord::new(7, 2), &map));
        assert!(!purview.is_within(origin, HexCoord::new(8, 2), &map));
    }

    #[test]
    fn test_line_occlusion() {
        let mut map = open_map();
        map.set_terrain(HexCoord::new(4, 2), Terrain::Wall);
        let origin = HexCoord::new(2, 2);
        let target = HexCoord::new(6, 2);

        let mut blind = Purview::new(10, PurviewShape::Line).with_occludes(true);
        assert!(!blind.is_within(origin, target, &map));

        let mut through = Purview::new(10, PurviewShape::Line);
        assert!(through.is_within(origin, target, &map));
    }

    #[test]
    fn test_area_routes_around_walls() {
        let mut map = open_map();
        // Wall with no gap between origin and target column
        for r in 0..20 {
            map.set_terrain(HexCoord::new(5, r), Terrain::Wall);
        }
        let mut purview = Purview::new(10, PurviewShape::Area);
        assert!(purview.is_within(HexCoord::new(3, 5), HexCoord::new(4, 5), &map));
        assert!(!purview.is_within(HexCoord::new(3, 5), HexCoord::new(7, 5), &map));
    }

    #[test]
    fn test_area_cache_until_invalidated() {
        let mut map = open_map();
        let mut purview = Purview::new(4, PurviewShape::Area);
        let origin = HexCoord::new(5, 5);
        let target = HexCoord::new(7, 5);
        assert!(purview.is_within(origin, target, &map));

        // Seal the target off; cached area still answers until invalidated
        for n in target.neighbors() {
            map.set_terrain(n, Terrain::Wall);
        }
        assert!(purview.is_within(origin, target, &map));
        purview.invalidate();
        assert!(!purview.is_within(origin, target, &map));
    }

    #[test]
    fn test_area_cache_rebuilds_on_adjustment() {
        let map = open_map();
        let mut purview = Purview::new(2, PurviewShape::Area);
        let origin = HexCoord::new(5, 5);
        let far = HexCoord::new(9, 5);
        assert!(!purview.is_within(origin, far, &map));
        purview.apply_adjustment(2);
        assert!(purview.is_within(origin, far, &map));
    }

    #[test]
    fn test_pathing_budget() {
        let map = open_map();
        let mut purview = Purview::new(3, PurviewShape::Pathing);
        let origin = HexCoord::new(2, 2);
        assert!(purview.is_within(origin, HexCoord::new(5, 2), &map));
        assert!(!purview.is_within(origin, HexCoord::new(6, 2), &map));
    }

    #[test]
    fn test_pathing_blocked() {
        let mut map = open_map();
        for n in HexCoord::new(8, 8).neighbors() {
            map.set_terrain(n, Terrain::Wall);
        }
        let mut purview = Purview::new(20, PurviewShape::Pathing);
        assert!(!purview.is_within(HexCoord::new(2, 2), HexCoord::new(8, 8), &map));
    }

    #[test]
    fn test_diffuse_without_curve_is_full() {
        let purview = Purview::new(10, PurviewShape::Line);
        assert_eq!(purview.diffuse(7), 1.0);
    }

    #[test]
    fn test_diffuser_follows_reach() {
        let mut purview = Purview::new(4, PurviewShape::Area)
            .with_diffuser(Diffuser::new(DiffuserKind::Linear));
        assert_eq!(purview.diffuser().unwrap().steps(), 4);
        assert!((purview.diffuse(2) - 0.5).abs() < 1e-9);

        purview.apply_adjustment(4);
        assert_eq!(purview.diffuser().unwrap().steps(), 8);
        assert!((purview.diffuse(2) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_ordering_by_value_then_effective() {
        let a = Purview::new(5, PurviewShape::Line);
        let mut b = Purview::new(5, PurviewShape::Area);
        assert_eq!(a, b);
        b.apply_adjustment(1);
        assert!(a < b);
        let c = Purview::new(6, PurviewShape::Line);
        assert!(b < c);
    }
}
