//! Fractional mana regeneration with carry

use crate::profile::StatProfile;
use crate::types::{EntityId, Stat};
use std::collections::HashMap;
use std::time::Duration;

/// Millionths of a mana point
const MICROS_PER_UNIT: u64 = 1_000_000;

/// Per-identity fractional mana remainders
///
/// `mana_regen` is read as mana per second. Whole units move into the pool and
/// the fraction carries to the next tick until the pool is full. The carry is
/// kept in millionths of a point so many short ticks add up exactly.
#[derive(Debug, Default)]
pub struct ManaRegenerator {
    remainders: HashMap<EntityId, u64>,
}

impl ManaRegenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one profile by `elapsed`, returning the mana restored
    pub fn tick(&mut self, profile: &mut StatProfile, elapsed: Duration) -> u64 {
        let id = profile.id();
        if profile.max_mana() == 0 || profile.current_mana() >= profile.max_mana() {
            self.remainders.remove(&id);
            return 0;
        }

        let rate = profile.stat_value(Stat::ManaRegen).max(0.0);
        // rate is per second, so rate * elapsed micros is micro-mana
        let gained = (rate * elapsed.as_micros() as f64).round();
        let gained = if gained.is_finite() { gained.min(u64::MAX as f64) as u64 } else { 0 };
        let accumulated = self.remainders.get(&id).copied().unwrap_or(0).saturating_add(gained);
        let whole = accumulated / MICROS_PER_UNIT;
        if whole == 0 {
            self.remainders.insert(id, accumulated);
            return 0;
        }

        let restored = profile.restore_mana(whole);
        if profile.current_mana() >= profile.max_mana() {
            self.remainders.remove(&id);
        } else {
            self.remainders.insert(id, accumulated % MICROS_PER_UNIT);
        }
        restored
    }

    pub fn remainder(&self, id: EntityId) -> f64 {
        self.remainders.get(&id).copied().unwrap_or(0) as f64 / MICROS_PER_UNIT as f64
    }

    pub fn clear(&mut self, id: EntityId) {
        self.remainders.remove(&id);
    }

    pub fn clear_all(&mut self) {
        self.remainders.clear();
    }
}
