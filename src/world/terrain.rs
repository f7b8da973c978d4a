//! Cell terrain and its effect on sight and movement
//!
//! Movement costs are integers on a x100 scale so a purview reach of 1 cell
//! equals 100 cost points and rough ground can weigh 150.

use serde::{Deserialize, Serialize};

/// Movement cost of one open cell
pub const COST_SCALE: u32 = 100;

/// Primary terrain type for a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Terrain {
    #[default]
    Open,
    Rough,
    Brush,       // Slows, hides, does not block sight
    Forest,      // Blocks LOS
    ShallowWater,
    DeepWater,   // Impassable
    Wall,        // Impassable, blocks LOS
    Road,
    Door,        // Passable, blocks LOS
}

impl Terrain {
    /// Cost to enter this cell, `None` if impassable
    pub fn movement_cost(&self) -> Option<u32> {
        match self {
            Terrain::Open => Some(100),
            Terrain::Rough => Some(150),
            Terrain::Brush => Some(150),
            Terrain::Forest => Some(250),
            Terrain::ShallowWater => Some(200),
            Terrain::DeepWater => None,
            Terrain::Wall => None,
            Terrain::Road => Some(70),
            Terrain::Door => Some(120),
        }
    }

    /// Does this terrain block line of sight?
    pub fn blocks_los(&self) -> bool {
        matches!(self, Terrain::Forest | Terrain::Wall | Terrain::Door)
    }

    pub fn is_passable(&self) -> bool {
        self.movement_cost().is_some()
    }
}
