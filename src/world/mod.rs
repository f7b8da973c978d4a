//! Host world collaborators and the reference hex world

pub mod agent;
pub mod geometry;
pub mod hex;
pub mod map;
pub mod pathfinding;
pub mod terrain;

pub use agent::{AgentSnapshot, ConcealmentProfile, Organ};
pub use geometry::{Geometry, LocationTracker, Untracked};
pub use hex::HexCoord;
pub use map::{Cell, HexMap};
pub use pathfinding::find_path;
pub use terrain::{Terrain, COST_SCALE};
