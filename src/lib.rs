//! Covert Sense - multi-channel detection of concealed actions
//!
//! An agent performs a covert action that gives off signals on several
//! sense channels. Each observer's senses decide, through reach, distance
//! falloff and a contested roll, whether and how strongly they notice it.

pub mod core;
pub mod detection;
pub mod perception;
pub mod session;
pub mod stealth;
pub mod world;
