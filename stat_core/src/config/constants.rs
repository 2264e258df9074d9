//! Tunable runtime constants

use crate::types::{Stat, StatMap};
use serde::{Deserialize, Deserializer, Serialize};

/// Baseline values for freshly created profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDefaults {
    /// Baseline for any stat without an override
    #[serde(default)]
    pub default_stat_value: f64,
    /// Per-stat baseline overrides
    ///
    /// Entries from a config file are laid over the built-in table, so a file
    /// that only sets `health` keeps the default `speed` of 100.
    #[serde(default = "default_overrides", deserialize_with = "overrides_over_defaults")]
    pub overrides: StatMap,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        ProfileDefaults {
            default_stat_value: 0.0,
            overrides: default_overrides(),
            max_level: default_max_level(),
        }
    }
}

impl ProfileDefaults {
    /// Baseline a new profile starts with for `stat`
    pub fn baseline(&self, stat: Stat) -> f64 {
        if self.overrides.contains(stat) {
            self.overrides.get(stat)
        } else {
            self.default_stat_value
        }
    }
}

fn default_overrides() -> StatMap {
    StatMap::from([
        (Stat::Health, 100.0),
        (Stat::Intelligence, 100.0),
        (Stat::Speed, 100.0),
        (Stat::CritChance, 30.0),
        (Stat::CritDamage, 50.0),
        (Stat::ManaRegen, 2.0),
    ])
}

fn overrides_over_defaults<'de, D>(deserializer: D) -> Result<StatMap, D::Error>
where
    D: Deserializer<'de>,
{
    let configured = StatMap::deserialize(deserializer)?;
    let mut overrides = default_overrides();
    for (stat, value) in configured.iter() {
        overrides.insert(stat, value);
    }
    Ok(overrides)
}

fn default_max_level() -> u32 {
    60
}

/// Walk speed derived from the speed stat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    pub base_walk_speed: f64,
    pub max_walk_speed: f64,
    pub min_walk_speed: f64,
    /// Speed stat value that maps to `base_walk_speed`
    pub speed_baseline: f64,
}

impl Default for MovementSettings {
    fn default() -> Self {
        MovementSettings {
            base_walk_speed: 0.2,
            max_walk_speed: 0.7,
            min_walk_speed: 0.05,
            speed_baseline: 100.0,
        }
    }
}

/// Attack speed attribute derived from the attack speed stat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatSettings {
    pub base_attack_speed: f64,
    pub attack_speed_per_point: f64,
    pub max_attack_speed: f64,
}

impl Default for CombatSettings {
    fn default() -> Self {
        CombatSettings {
            base_attack_speed: 4.0,
            attack_speed_per_point: 0.02,
            max_attack_speed: 8.0,
        }
    }
}

/// Skill mana cost and cooldown reduction rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilitySettings {
    pub cooldown_reduction_per_attack_speed_point: f64,
    pub cooldown_reduction_per_intelligence_point: f64,
    pub minimum_cooldown_seconds: f64,
    pub mana_cost_reduction_per_intelligence_point: f64,
    pub mana_cost_reduction_per_ability_power_point: f64,
    /// Cost never drops below this fraction of the base cost
    pub minimum_mana_cost_multiplier: f64,
    /// Absolute cost floor for skills that cost anything at all
    pub minimum_mana_cost: f64,
}

impl Default for AbilitySettings {
    fn default() -> Self {
        AbilitySettings {
            cooldown_reduction_per_attack_speed_point: 0.002,
            cooldown_reduction_per_intelligence_point: 0.0,
            minimum_cooldown_seconds: 0.2,
            mana_cost_reduction_per_intelligence_point: 0.001,
            mana_cost_reduction_per_ability_power_point: 0.001,
            minimum_mana_cost_multiplier: 0.2,
            minimum_mana_cost: 1.0,
        }
    }
}

/// Gathering delay and mining haste tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatheringSettings {
    pub minimum_gather_delay_seconds: f64,
    pub mining_speed_delay_divisor: f64,
    pub mining_speed_haste_per_tier: f64,
    pub mining_speed_max_haste_tier: u32,
}

impl Default for GatheringSettings {
    fn default() -> Self {
        GatheringSettings {
            minimum_gather_delay_seconds: 0.25,
            mining_speed_delay_divisor: 100.0,
            mining_speed_haste_per_tier: 80.0,
            mining_speed_max_haste_tier: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let movement = MovementSettings::default();
        assert!((movement.base_walk_speed - 0.2).abs() < f64::EPSILON);
        let gathering = GatheringSettings::default();
        assert!((gathering.mining_speed_haste_per_tier - 80.0).abs() < f64::EPSILON);
        assert_eq!(gathering.mining_speed_max_haste_tier, 4);
    }

    #[test]
    fn test_profile_baseline_uses_override_then_default() {
        let defaults = ProfileDefaults {
            default_stat_value: 3.0,
            ..ProfileDefaults::default()
        };
        assert!((defaults.baseline(Stat::Health) - 100.0).abs() < f64::EPSILON);
        assert!((defaults.baseline(Stat::Ferocity) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_overrides_keep_other_defaults() {
        let toml = r#"
[overrides]
health = 250.0
speed = 0.0
"#;
        let defaults: ProfileDefaults = toml::from_str(toml).unwrap();
        assert!((defaults.baseline(Stat::Health) - 250.0).abs() < f64::EPSILON);
        assert!(defaults.baseline(Stat::Speed).abs() < f64::EPSILON);
        assert!((defaults.baseline(Stat::Intelligence) - 100.0).abs() < f64::EPSILON);
        assert!((defaults.baseline(Stat::ManaRegen) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_ability_settings() {
        let toml = r#"
cooldown_reduction_per_attack_speed_point = 0.01
minimum_mana_cost = 2.0
"#;
        let settings: AbilitySettings = toml::from_str(toml).unwrap();
        assert!((settings.cooldown_reduction_per_attack_speed_point - 0.01).abs() < f64::EPSILON);
        assert!((settings.minimum_mana_cost - 2.0).abs() < f64::EPSILON);
        // unspecified fields fall back to defaults
        assert!((settings.minimum_cooldown_seconds - 0.2).abs() < f64::EPSILON);
    }
}
