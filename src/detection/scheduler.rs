use serde::{Deserialize, Serialize};

use crate::core::types::EntityId;
use crate::detection::opinion::Detection;

/// Receives detections; what the perceiver does about them is up to the host
pub trait BehaviorScheduler {
    fn schedule(&mut self, detection: &Detection);
}

/// Scheduler that just keeps everything it is given, in delivery order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpinionLog {
    entries: Vec<Detection>,
}

impl OpinionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Detection> {
        self.entries.last()
    }

    pub fn for_perceiver(&self, perceiver: EntityId) -> impl Iterator<Item = &Detection> {
        self.entries.iter().filter(move |d| d.perceiver() == perceiver)
    }

    pub fn drain(&mut self) -> Vec<Detection> {
        std::mem::take(&mut self.entries)
    }
}

impl BehaviorScheduler for OpinionLog {
    fn schedule(&mut self, detection: &Detection) {
        tracing::debug!(
            perceiver = ?detection.perceiver(),
            hider = ?detection.hider(),
            level = detection.level().name(),
            "opinion scheduled"
        );
        self.entries.push(detection.clone());
    }
}
