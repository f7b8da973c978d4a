//! Sense channels and their fixed priority

use serde::{Deserialize, Serialize};

use crate::world::agent::Organ;

/// One way a covert action can be noticed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SenseChannel {
    None,
    Kinesthetic, // Touch, vibration, being struck
    Thermal,
    Olfactory,
    Auditory,
    Visual,
    Sixth,
    Psionic,
    Other,
}

impl SenseChannel {
    /// Every channel, in declaration order
    pub fn all() -> [SenseChannel; 9] {
        [
            SenseChannel::None,
            SenseChannel::Kinesthetic,
            SenseChannel::Thermal,
            SenseChannel::Olfactory,
            SenseChannel::Auditory,
            SenseChannel::Visual,
            SenseChannel::Sixth,
            SenseChannel::Psionic,
            SenseChannel::Other,
        ]
    }

    /// Tie-break rank when two channels reach the same awareness (higher wins)
    pub fn priority(&self) -> u8 {
        match self {
            SenseChannel::Kinesthetic => 8,
            SenseChannel::Thermal => 7,
            SenseChannel::Olfactory => 6,
            SenseChannel::Auditory => 5,
            SenseChannel::Visual => 4,
            SenseChannel::Sixth => 3,
            SenseChannel::Psionic => 2,
            SenseChannel::Other => 1,
            SenseChannel::None => 0,
        }
    }

    /// Does this channel outrank the other for tie-breaking?
    pub fn outranks(&self, other: &SenseChannel) -> bool {
        self.priority() > other.priority()
    }

    /// Organ a perceiver needs to use this channel
    pub fn required_organ(&self) -> Option<Organ> {
        match self {
            SenseChannel::Visual => Some(Organ::Eyes),
            SenseChannel::Auditory => Some(Organ::Ears),
            SenseChannel::Olfactory => Some(Organ::Nose),
            SenseChannel::Kinesthetic | SenseChannel::Thermal => Some(Organ::Skin),
            SenseChannel::Psionic | SenseChannel::Sixth => Some(Organ::Mind),
            SenseChannel::None | SenseChannel::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let ordered = [
            SenseChannel::Kinesthetic,
            SenseChannel::Thermal,
            SenseChannel::Olfactory,
            SenseChannel::Auditory,
            SenseChannel::Visual,
            SenseChannel::Sixth,
            SenseChannel::Psionic,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].outranks(&pair[1]), "{:?} should outrank {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_priority_is_total() {
        let mut priorities: Vec<u8> = SenseChannel::all().iter().map(|c| c.priority()).collect();
        priorities.sort_unstable();
        priorities.dedup();
        assert_eq!(priorities.len(), SenseChannel::all().len());
    }

    #[test]
    fn test_channel_does_not_outrank_itself() {
        assert!(!SenseChannel::Visual.outranks(&SenseChannel::Visual));
    }

    #[test]
    fn test_required_organs() {
        assert_eq!(SenseChannel::Visual.required_organ(), Some(Organ::Eyes));
        assert_eq!(SenseChannel::Auditory.required_organ(), Some(Organ::Ears));
        assert_eq!(SenseChannel::Other.required_organ(), None);
    }
}
