//! Derived attribute calculation
//!
//! Pure functions of aggregated stats, level and an [`EngineConfig`]. Nothing
//! here caches or mutates; callers decide when to recompute.
//!
//! Formulas:
//! - pools and chances: see [`LinearFormula`](crate::config::LinearFormula)
//! - walk speed: `clamp(min, max, base_walk * speed / speed_baseline)`
//! - attack speed: `min(max, base + attack_speed * per_point)`
//! - haste tier: `clamp(floor(mining_speed / haste_per_tier), 0, max_tier)`
//! - gather delay: `max(min_delay, base_delay / max(1, 1 + mining_speed / divisor))`

use crate::config::{CombatSettings, EngineConfig, GatheringSettings, MovementSettings};
use crate::types::{Stat, StatTotals};
use serde::{Deserialize, Serialize};

/// Lowest attack speed ever published
pub const MIN_ATTACK_SPEED: f64 = 0.1;

/// Everything computed from a profile's aggregated stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedAttributes {
    pub max_health: u64,
    pub max_mana: u64,
    pub crit_chance: f64,
    pub crit_damage_bonus: f64,
    pub evasion_chance: f64,
    pub physical_reduction: f64,
    pub magical_reduction: f64,
    pub walk_speed: f64,
    pub attack_speed: f64,
    pub haste_tier: u32,
    /// Divisor applied to gather delays (1.0 = unmodified)
    pub gather_speed_multiplier: f64,
}

impl Default for DerivedAttributes {
    fn default() -> Self {
        DerivedAttributes {
            max_health: 1,
            max_mana: 0,
            crit_chance: 0.0,
            crit_damage_bonus: 1.0,
            evasion_chance: 0.0,
            physical_reduction: 0.0,
            magical_reduction: 0.0,
            walk_speed: MovementSettings::default().base_walk_speed,
            attack_speed: CombatSettings::default().base_attack_speed,
            haste_tier: 0,
            gather_speed_multiplier: 1.0,
        }
    }
}

impl DerivedAttributes {
    /// Haste amplifier for the current tier, `None` at tier 0
    pub fn haste_amplifier(&self) -> Option<u8> {
        haste_amplifier(self.haste_tier)
    }
}

/// Compute every derived attribute
pub fn calculate(totals: &StatTotals, level: u32, config: &EngineConfig) -> DerivedAttributes {
    let d = &config.derived;
    let max_health = d.max_health.evaluate(totals, level).round().max(1.0) as u64;
    let max_mana = d.max_mana.evaluate(totals, level).round().max(0.0) as u64;

    DerivedAttributes {
        max_health,
        max_mana,
        crit_chance: d.crit_chance.evaluate(totals, level),
        crit_damage_bonus: d.crit_damage_bonus.evaluate(totals, level),
        evasion_chance: d.evasion_chance.evaluate(totals, level),
        physical_reduction: d.physical_reduction.evaluate(totals, level),
        magical_reduction: d.magical_reduction.evaluate(totals, level),
        walk_speed: walk_speed(totals.get(Stat::Speed), &config.movement),
        attack_speed: attack_speed(totals.get(Stat::AttackSpeed), &config.combat),
        haste_tier: haste_tier(totals.get(Stat::MiningSpeed), &config.gathering),
        gather_speed_multiplier: gather_speed_multiplier(
            totals.get(Stat::MiningSpeed),
            &config.gathering,
        ),
    }
}

/// Walk speed for a speed stat value
pub fn walk_speed(speed: f64, settings: &MovementSettings) -> f64 {
    let baseline = if settings.speed_baseline <= 0.0 {
        100.0
    } else {
        settings.speed_baseline
    };
    let scaled = settings.base_walk_speed * (speed / baseline);
    scaled.max(settings.min_walk_speed).min(settings.max_walk_speed)
}

/// Attack speed attribute for an attack speed stat value
pub fn attack_speed(attack_speed_stat: f64, settings: &CombatSettings) -> f64 {
    let value = settings.base_attack_speed + attack_speed_stat * settings.attack_speed_per_point;
    value.min(settings.max_attack_speed)
}

/// Discrete haste tier for a mining speed stat value
pub fn haste_tier(mining_speed: f64, settings: &GatheringSettings) -> u32 {
    if settings.mining_speed_haste_per_tier <= 0.0 || mining_speed <= 0.0 {
        return 0;
    }
    let tier = (mining_speed / settings.mining_speed_haste_per_tier).floor();
    let max = f64::from(settings.mining_speed_max_haste_tier);
    tier.clamp(0.0, max) as u32
}

/// `tier - 1`, or `None` when there is no haste
pub fn haste_amplifier(tier: u32) -> Option<u8> {
    tier.checked_sub(1).map(|amp| amp.min(u32::from(u8::MAX)) as u8)
}

/// Divisor applied to gather delays for a mining speed stat value
pub fn gather_speed_multiplier(mining_speed: f64, settings: &GatheringSettings) -> f64 {
    let factor = if settings.mining_speed_delay_divisor <= 0.0 {
        0.0
    } else {
        mining_speed / settings.mining_speed_delay_divisor
    };
    (1.0 + factor).max(1.0)
}

/// Effective delay in seconds for gathering a node with `base_delay_seconds`
pub fn gather_delay(base_delay_seconds: f64, mining_speed: f64, settings: &GatheringSettings) -> f64 {
    let delay = base_delay_seconds / gather_speed_multiplier(mining_speed, settings);
    delay.max(settings.minimum_gather_delay_seconds)
}
