//! Turning perception results into detections for behavior

pub mod opinion;
pub mod resolver;
pub mod scheduler;

pub use opinion::{ChannelVerdict, Detection, Opinion};
pub use resolver::{select_best, DetectionResolver};
pub use scheduler::{BehaviorScheduler, OpinionLog};
