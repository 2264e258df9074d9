//! Core types shared by every stat subsystem

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Identity of a live entity (player or mob)
pub type EntityId = Uuid;

// ============================================================================
// Stat
// ============================================================================

/// A named numeric dimension of character power
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Health,
    Defense,
    TrueDefense,
    Strength,
    CritChance,
    CritDamage,
    Intelligence,
    ManaRegen,
    AbilityPower,
    AttackSpeed,
    Ferocity,
    Evasion,
    Speed,
    MagicFind,
    PetLuck,
    MiningSpeed,
    MiningFortune,
    FarmingFortune,
    ForagingFortune,
    FishingFortune,
}

impl Stat {
    /// Number of stat variants
    pub const COUNT: usize = 20;

    /// All stats in declaration order
    pub const ALL: [Stat; Stat::COUNT] = [
        Stat::Health,
        Stat::Defense,
        Stat::TrueDefense,
        Stat::Strength,
        Stat::CritChance,
        Stat::CritDamage,
        Stat::Intelligence,
        Stat::ManaRegen,
        Stat::AbilityPower,
        Stat::AttackSpeed,
        Stat::Ferocity,
        Stat::Evasion,
        Stat::Speed,
        Stat::MagicFind,
        Stat::PetLuck,
        Stat::MiningSpeed,
        Stat::MiningFortune,
        Stat::FarmingFortune,
        Stat::ForagingFortune,
        Stat::FishingFortune,
    ];

    /// Get all stats
    pub fn all() -> &'static [Stat] {
        &Self::ALL
    }

    /// Snake case identifier, as used in config files
    pub fn name(&self) -> &'static str {
        match self {
            Stat::Health => "health",
            Stat::Defense => "defense",
            Stat::TrueDefense => "true_defense",
            Stat::Strength => "strength",
            Stat::CritChance => "crit_chance",
            Stat::CritDamage => "crit_damage",
            Stat::Intelligence => "intelligence",
            Stat::ManaRegen => "mana_regen",
            Stat::AbilityPower => "ability_power",
            Stat::AttackSpeed => "attack_speed",
            Stat::Ferocity => "ferocity",
            Stat::Evasion => "evasion",
            Stat::Speed => "speed",
            Stat::MagicFind => "magic_find",
            Stat::PetLuck => "pet_luck",
            Stat::MiningSpeed => "mining_speed",
            Stat::MiningFortune => "mining_fortune",
            Stat::FarmingFortune => "farming_fortune",
            Stat::ForagingFortune => "foraging_fortune",
            Stat::FishingFortune => "fishing_fortune",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Stat::Health => "Health",
            Stat::Defense => "Defense",
            Stat::TrueDefense => "True Defense",
            Stat::Strength => "Strength",
            Stat::CritChance => "Crit Chance",
            Stat::CritDamage => "Crit Damage",
            Stat::Intelligence => "Intelligence",
            Stat::ManaRegen => "Mana Regen",
            Stat::AbilityPower => "Ability Power",
            Stat::AttackSpeed => "Attack Speed",
            Stat::Ferocity => "Ferocity",
            Stat::Evasion => "Evasion",
            Stat::Speed => "Speed",
            Stat::MagicFind => "Magic Find",
            Stat::PetLuck => "Pet Luck",
            Stat::MiningSpeed => "Mining Speed",
            Stat::MiningFortune => "Mining Fortune",
            Stat::FarmingFortune => "Farming Fortune",
            Stat::ForagingFortune => "Foraging Fortune",
            Stat::FishingFortune => "Fishing Fortune",
        }
    }

    /// Storage key, e.g. `stat.mining_speed`
    pub fn key(&self) -> String {
        format!("stat.{}", self.name())
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Error parsing a stat name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stat '{0}'")]
pub struct StatParseError(pub String);

impl FromStr for Stat {
    type Err = StatParseError;

    /// Accepts `mining_speed`, `Mining-Speed`, `stat.mining_speed` and the like
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let bare = lowered.strip_prefix("stat.").unwrap_or(&lowered);
        let normalized = bare.replace(['-', ' '], "_");
        Stat::ALL
            .iter()
            .copied()
            .find(|stat| stat.name() == normalized)
            .ok_or_else(|| StatParseError(s.to_string()))
    }
}

// ============================================================================
// StatMap
// ============================================================================

/// Sparse per-stat values (a modifier layer, a bonus table, baseline overrides)
///
/// Deserialization is lenient: unknown stat names are skipped with a warning
/// instead of failing the whole table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct StatMap(BTreeMap<Stat, f64>);

impl StatMap {
    pub fn new() -> Self {
        StatMap(BTreeMap::new())
    }

    /// Build from externally named entries, skipping unknown stat names
    ///
    /// `context` identifies the data source in the warning.
    pub fn from_named<I, K>(entries: I, context: &str) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut map = StatMap::new();
        for (name, value) in entries {
            match name.as_ref().parse::<Stat>() {
                Ok(stat) => map.add(stat, value),
                Err(err) => {
                    tracing::warn!(context, error = %err, "skipping unknown stat in modifier data");
                }
            }
        }
        map
    }

    pub fn get(&self, stat: Stat) -> f64 {
        self.0.get(&stat).copied().unwrap_or(0.0)
    }

    pub fn insert(&mut self, stat: Stat, value: f64) {
        self.0.insert(stat, value);
    }

    /// Add to the existing value for a stat
    pub fn add(&mut self, stat: Stat, value: f64) {
        *self.0.entry(stat).or_insert(0.0) += value;
    }

    pub fn remove(&mut self, stat: Stat) -> Option<f64> {
        self.0.remove(&stat)
    }

    pub fn contains(&self, stat: Stat) -> bool {
        self.0.contains_key(&stat)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, f64)> + '_ {
        self.0.iter().map(|(stat, value)| (*stat, *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy with zero entries dropped
    pub fn without_zeros(&self) -> StatMap {
        StatMap(self.0.iter().filter(|(_, v)| **v != 0.0).map(|(k, v)| (*k, *v)).collect())
    }

    /// Copy with every value multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> StatMap {
        StatMap(self.0.iter().map(|(k, v)| (*k, v * factor)).collect())
    }

    /// Add every entry of `other` into this map
    pub fn merge(&mut self, other: &StatMap) {
        for (stat, value) in other.iter() {
            self.add(stat, value);
        }
    }
}

impl FromIterator<(Stat, f64)> for StatMap {
    fn from_iter<T: IntoIterator<Item = (Stat, f64)>>(iter: T) -> Self {
        let mut map = StatMap::new();
        for (stat, value) in iter {
            map.add(stat, value);
        }
        map
    }
}

impl<const N: usize> From<[(Stat, f64); N]> for StatMap {
    fn from(entries: [(Stat, f64); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl From<BTreeMap<String, f64>> for StatMap {
    fn from(raw: BTreeMap<String, f64>) -> Self {
        StatMap::from_named(raw, "stat table")
    }
}

impl From<StatMap> for BTreeMap<String, f64> {
    fn from(map: StatMap) -> Self {
        map.0.into_iter().map(|(stat, value)| (stat.name().to_string(), value)).collect()
    }
}

// ============================================================================
// StatTotals
// ============================================================================

/// Dense aggregated value for every stat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatTotals {
    values: [f64; Stat::COUNT],
}

impl Default for StatTotals {
    fn default() -> Self {
        StatTotals { values: [0.0; Stat::COUNT] }
    }
}

impl StatTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: Stat) -> f64 {
        self.values[stat.index()]
    }

    pub fn set(&mut self, stat: Stat, value: f64) {
        self.values[stat.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, f64)> + '_ {
        Stat::ALL.iter().map(move |stat| (*stat, self.get(*stat)))
    }
}

impl FromIterator<(Stat, f64)> for StatTotals {
    fn from_iter<T: IntoIterator<Item = (Stat, f64)>>(iter: T) -> Self {
        let mut totals = StatTotals::new();
        for (stat, value) in iter {
            totals.set(stat, value);
        }
        totals
    }
}
