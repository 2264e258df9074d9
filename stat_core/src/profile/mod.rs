//! Stat profiles
//!
//! A [`StatProfile`] is everything the engine knows about one identity: its
//! baseline stats, the modifier ledger other subsystems write into, resource
//! pools, progression and skill cooldowns.
//!
//! Derived attributes are recomputed only when a caller asks for it through
//! [`StatProfile::recalculate_derived_attributes`]. Batch ledger writes first,
//! then recalculate once.

mod ledger;

pub use ledger::{
    pet_key, status_key, zone_key, ModifierLedger, EQUIPMENT_KEY, PET_PREFIX, STATUS_PREFIX,
    ZONE_PREFIX,
};

use crate::config::EngineConfig;
use crate::derived::{self, DerivedAttributes};
use crate::time::Timestamp;
use crate::types::{EntityId, Stat, StatMap, StatTotals};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Per-identity stats, pools and cooldowns
///
/// The ledger and the derived cache are session state and are not serialized;
/// call [`rehydrate`](Self::rehydrate) after loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatProfile {
    id: EntityId,
    name: String,
    baselines: StatMap,
    current_health: u64,
    max_health: u64,
    current_mana: u64,
    max_mana: u64,
    level: u32,
    #[serde(default)]
    experience: u64,
    #[serde(default)]
    currency: u64,
    /// Skill id -> cooldown expiry
    #[serde(default)]
    cooldowns: BTreeMap<String, Timestamp>,
    #[serde(skip)]
    ledger: ModifierLedger,
    #[serde(skip)]
    derived: DerivedAttributes,
}

impl StatProfile {
    /// Fresh profile at level 1 with full pools
    pub fn new(id: EntityId, name: impl Into<String>, config: &EngineConfig) -> Self {
        let baselines = Stat::all()
            .iter()
            .map(|stat| (*stat, config.profile.baseline(*stat)))
            .collect();
        let mut profile = StatProfile {
            id,
            name: name.into(),
            baselines,
            current_health: 0,
            max_health: 1,
            current_mana: 0,
            max_mana: 0,
            level: 1,
            experience: 0,
            currency: 0,
            cooldowns: BTreeMap::new(),
            ledger: ModifierLedger::new(),
            derived: DerivedAttributes::default(),
        };
        profile.recalculate_derived_attributes(config);
        profile.current_health = profile.max_health;
        profile.current_mana = profile.max_mana;
        profile
    }

    /// Rebuild session state after deserialization
    pub fn rehydrate(&mut self, config: &EngineConfig) {
        self.ledger = ModifierLedger::new();
        self.level = self.level.clamp(1, config.profile.max_level.max(1));
        self.recalculate_derived_attributes(config);
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ------------------------------------------------------------------
    // Stats and ledger
    // ------------------------------------------------------------------

    pub fn baseline(&self, stat: Stat) -> f64 {
        self.baselines.get(stat)
    }

    pub fn set_baseline(&mut self, stat: Stat, value: f64) {
        self.baselines.insert(stat, value);
    }

    /// Baseline plus every installed layer
    pub fn stat_value(&self, stat: Stat) -> f64 {
        self.baseline(stat) + self.ledger.total(stat)
    }

    /// Aggregated value of every stat
    pub fn totals(&self) -> StatTotals {
        Stat::all().iter().map(|stat| (*stat, self.stat_value(*stat))).collect()
    }

    pub fn set_layer(&mut self, key: impl Into<String>, deltas: &StatMap) {
        self.ledger.set_layer(key, deltas);
    }

    pub fn clear_layer(&mut self, key: &str) -> bool {
        self.ledger.clear_layer(key)
    }

    pub fn clear_layers_with_prefix(&mut self, prefix: &str) -> usize {
        self.ledger.clear_prefix(prefix)
    }

    pub fn layer(&self, key: &str) -> Option<&StatMap> {
        self.ledger.layer(key)
    }

    pub fn layer_keys(&self) -> impl Iterator<Item = &str> {
        self.ledger.keys()
    }

    pub fn ledger(&self) -> &ModifierLedger {
        &self.ledger
    }

    /// Recompute derived attributes and re-clamp pools to the new maxima
    pub fn recalculate_derived_attributes(&mut self, config: &EngineConfig) {
        self.derived = derived::calculate(&self.totals(), self.level, config);
        self.max_health = self.derived.max_health;
        self.max_mana = self.derived.max_mana;
        self.current_health = self.current_health.min(self.max_health);
        self.current_mana = self.current_mana.min(self.max_mana);
    }

    /// Attributes as of the last recalculation
    pub fn derived(&self) -> &DerivedAttributes {
        &self.derived
    }

    // ------------------------------------------------------------------
    // Pools
    // ------------------------------------------------------------------

    pub fn current_health(&self) -> u64 {
        self.current_health
    }

    pub fn max_health(&self) -> u64 {
        self.max_health
    }

    pub fn current_mana(&self) -> u64 {
        self.current_mana
    }

    pub fn max_mana(&self) -> u64 {
        self.max_mana
    }

    pub fn set_current_health(&mut self, value: u64) {
        self.current_health = value.min(self.max_health);
    }

    pub fn set_current_mana(&mut self, value: u64) {
        self.current_mana = value.min(self.max_mana);
    }

    pub fn is_dead(&self) -> bool {
        self.current_health == 0
    }

    /// Apply damage, rounding up; non-positive amounts are ignored
    ///
    /// Returns the health actually lost.
    pub fn take_damage(&mut self, amount: f64) -> u64 {
        if amount.is_nan() || amount <= 0.0 {
            return 0;
        }
        let amount = amount.ceil().min(u64::MAX as f64) as u64;
        let lost = amount.min(self.current_health);
        self.current_health -= lost;
        lost
    }

    /// Returns the health actually restored
    pub fn heal(&mut self, amount: u64) -> u64 {
        let before = self.current_health;
        self.set_current_health(before.saturating_add(amount));
        self.current_health - before
    }

    /// Spend mana if enough is available
    pub fn consume_mana(&mut self, amount: u64) -> bool {
        if self.current_mana < amount {
            return false;
        }
        self.current_mana -= amount;
        true
    }

    /// Returns the mana actually restored
    pub fn restore_mana(&mut self, amount: u64) -> u64 {
        let before = self.current_mana;
        self.set_current_mana(before.saturating_add(amount));
        self.current_mana - before
    }

    // ------------------------------------------------------------------
    // Progression
    // ------------------------------------------------------------------

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Clamp to `[1, max_level]` and recalculate
    pub fn set_level(&mut self, level: u32, config: &EngineConfig) {
        self.level = level.clamp(1, config.profile.max_level.max(1));
        self.recalculate_derived_attributes(config);
    }

    pub fn experience(&self) -> u64 {
        self.experience
    }

    pub fn set_experience(&mut self, experience: i64) {
        self.experience = experience.max(0) as u64;
    }

    pub fn currency(&self) -> u64 {
        self.currency
    }

    pub fn set_currency(&mut self, currency: i64) {
        self.currency = currency.max(0) as u64;
    }

    // ------------------------------------------------------------------
    // Cooldowns
    // ------------------------------------------------------------------

    /// Start a cooldown; a zero duration clears it
    pub fn set_cooldown(&mut self, skill_id: &str, now: Timestamp, duration: Duration) {
        if duration.is_zero() {
            self.cooldowns.remove(skill_id);
        } else {
            self.cooldowns.insert(skill_id.to_string(), now + duration);
        }
    }

    pub fn clear_cooldown(&mut self, skill_id: &str) {
        self.cooldowns.remove(skill_id);
    }

    pub fn cooldown_expiry(&self, skill_id: &str) -> Option<Timestamp> {
        self.cooldowns.get(skill_id).copied()
    }

    pub fn is_on_cooldown(&self, skill_id: &str, now: Timestamp) -> bool {
        self.cooldown_expiry(skill_id).is_some_and(|expiry| now < expiry)
    }

    /// Time until the cooldown ends, zero when ready
    pub fn remaining_cooldown(&self, skill_id: &str, now: Timestamp) -> Duration {
        self.cooldown_expiry(skill_id)
            .map(|expiry| expiry.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile() -> (StatProfile, EngineConfig) {
        let config = EngineConfig::default();
        (StatProfile::new(Uuid::new_v4(), "Tester", &config), config)
    }

    #[test]
    fn test_new_profile_starts_full() {
        let (p, _) = profile();
        assert_eq!(p.level(), 1);
        assert_eq!(p.max_health(), 100);
        assert_eq!(p.current_health(), 100);
        assert_eq!(p.current_mana(), p.max_mana());
    }

    #[test]
    fn test_layer_example() {
        let (mut p, _) = profile();
        p.set_baseline(Stat::Defense, 10.0);
        p.set_layer(EQUIPMENT_KEY, &StatMap::from([(Stat::Defense, 15.0)]));
        p.set_layer(zone_key("crypt"), &StatMap::from([(Stat::Defense, -5.0)]));
        assert!((p.stat_value(Stat::Defense) - 20.0).abs() < f64::EPSILON);

        p.clear_layer("zone:crypt");
        assert!((p.stat_value(Stat::Defense) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_derived_is_stale_until_recalculated() {
        let (mut p, config) = profile();
        p.set_layer(EQUIPMENT_KEY, &StatMap::from([(Stat::Health, 50.0)]));
        assert_eq!(p.max_health(), 100);
        p.recalculate_derived_attributes(&config);
        assert_eq!(p.max_health(), 150);
        // current health is not raised by a larger max
        assert_eq!(p.current_health(), 100);
    }

    #[test]
    fn test_recalculate_clamps_pools_down() {
        let (mut p, config) = profile();
        p.set_layer(status_key("curse"), &StatMap::from([(Stat::Health, -60.0), (Stat::Intelligence, -90.0)]));
        p.recalculate_derived_attributes(&config);
        assert_eq!(p.max_health(), 40);
        assert_eq!(p.current_health(), 40);
        assert_eq!(p.current_mana(), 10);
    }

    #[test]
    fn test_pool_setters_clamp() {
        let (mut p, _) = profile();
        p.set_current_health(10_000);
        assert_eq!(p.current_health(), p.max_health());
        p.set_current_mana(10_000);
        assert_eq!(p.current_mana(), p.max_mana());
    }

    #[test]
    fn test_take_damage_rounds_up_and_ignores_non_positive() {
        let (mut p, _) = profile();
        assert_eq!(p.take_damage(2.1), 3);
        assert_eq!(p.current_health(), 97);
        assert_eq!(p.take_damage(-5.0), 0);
        assert_eq!(p.take_damage(f64::NAN), 0);
        assert_eq!(p.take_damage(1_000.0), 97);
        assert!(p.is_dead());
        assert_eq!(p.heal(30), 30);
        assert_eq!(p.heal(1_000), 70);
    }

    #[test]
    fn test_consume_and_restore_mana() {
        let (mut p, _) = profile();
        assert!(p.consume_mana(40));
        assert_eq!(p.current_mana(), 60);
        assert!(!p.consume_mana(61));
        assert_eq!(p.current_mana(), 60);
        assert_eq!(p.restore_mana(100), 40);
    }

    #[test]
    fn test_level_is_clamped() {
        let (mut p, config) = profile();
        p.set_level(0, &config);
        assert_eq!(p.level(), 1);
        p.set_level(500, &config);
        assert_eq!(p.level(), config.profile.max_level);
    }

    #[test]
    fn test_experience_and_currency_never_negative() {
        let (mut p, _) = profile();
        p.set_experience(-10);
        p.set_currency(-1);
        assert_eq!(p.experience(), 0);
        assert_eq!(p.currency(), 0);
        p.set_currency(250);
        assert_eq!(p.currency(), 250);
    }

    #[test]
    fn test_cooldowns() {
        let (mut p, _) = profile();
        let now = Timestamp::from_millis(1_000);
        p.set_cooldown("fireball", now, Duration::from_secs(2));
        assert!(p.is_on_cooldown("fireball", now));
        assert_eq!(p.remaining_cooldown("fireball", Timestamp::from_millis(2_500)), Duration::from_millis(500));
        assert!(!p.is_on_cooldown("fireball", Timestamp::from_millis(3_000)));
        assert_eq!(p.remaining_cooldown("fireball", Timestamp::from_millis(9_000)), Duration::ZERO);

        p.set_cooldown("fireball", now, Duration::ZERO);
        assert_eq!(p.cooldown_expiry("fireball"), None);
    }

    #[test]
    fn test_serialization_skips_ledger() {
        let (mut p, config) = profile();
        p.set_layer(EQUIPMENT_KEY, &StatMap::from([(Stat::Health, 50.0)]));
        p.recalculate_derived_attributes(&config);
        p.set_cooldown("dash", Timestamp::from_millis(10), Duration::from_secs(1));

        let json = serde_json::to_string(&p).unwrap();
        let mut restored: StatProfile = serde_json::from_str(&json).unwrap();
        restored.rehydrate(&config);

        assert_eq!(restored.id(), p.id());
        assert!(restored.ledger().is_empty());
        assert_eq!(restored.max_health(), 100);
        assert_eq!(restored.cooldown_expiry("dash"), Some(Timestamp::from_millis(1_010)));
    }
}
