//! Post-processing policies applied by [`ConcealedAction::configure`]

use crate::stealth::action::ConcealedAction;
use crate::stealth::channel::SenseChannel;

/// Adjusts an action's alerts after its defaults are in place
pub trait ActionPolicy {
    fn configure(&self, action: &mut ConcealedAction);
}

/// Intensity adjustment for a weapon tier.
///
/// The table is not linear and is kept exactly as tuned: tier 8 weapons are
/// quieter than a bare default, tier 7 is neutral, and anything unrecognised
/// counts as the crudest weapon.
pub fn weapon_tier_adjustment(tier: Option<u8>) -> i32 {
    match tier {
        Some(8) => -2,
        Some(7) => 0,
        Some(6) | Some(5) => 2,
        Some(4) | Some(3) => 3,
        Some(2) => 4,
        Some(1) => 5,
        _ => 6,
    }
}

/// Scales every alert of a weapon action by the wielded weapon's tier
#[derive(Debug, Clone, Copy, Default)]
pub struct WeaponTierPolicy;

impl ActionPolicy for WeaponTierPolicy {
    fn configure(&self, action: &mut ConcealedAction) {
        if !action.kind().uses_weapon() {
            return;
        }
        let delta = weapon_tier_adjustment(action.weapon_tier());
        for alert in action.alerts_mut() {
            alert.adjust_intensity(delta);
        }
    }
}

/// Flat intensity change on one channel (gear, spells, weather)
#[derive(Debug, Clone, Copy)]
pub struct ChannelIntensityPolicy {
    pub channel: SenseChannel,
    pub delta: i32,
}

impl ActionPolicy for ChannelIntensityPolicy {
    fn configure(&self, action: &mut ConcealedAction) {
        if let Some(alert) = action.alert_mut(self.channel) {
            alert.adjust_intensity(self.delta);
        }
    }
}
