//! Coefficients for the derived attribute formulas

use super::ConfigError;
use crate::types::{Stat, StatMap, StatTotals};
use serde::{Deserialize, Serialize};

/// `base + level * per_level + sum(stat * coefficient)`, bounded by `floor` and `cap`
///
/// The term table decides which stats feed the formula, so "vitality" or
/// "agility" style inputs are a matter of configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearFormula {
    pub base: f64,
    pub per_level: f64,
    pub terms: StatMap,
    pub floor: Option<f64>,
    pub cap: Option<f64>,
}

impl LinearFormula {
    pub fn new(base: f64) -> Self {
        LinearFormula { base, ..Self::default() }
    }

    pub fn with_term(mut self, stat: Stat, coefficient: f64) -> Self {
        self.terms.add(stat, coefficient);
        self
    }

    pub fn with_per_level(mut self, per_level: f64) -> Self {
        self.per_level = per_level;
        self
    }

    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = Some(floor);
        self
    }

    pub fn with_cap(mut self, cap: f64) -> Self {
        self.cap = Some(cap);
        self
    }

    /// Evaluate against aggregated stats at a level
    pub fn evaluate(&self, totals: &StatTotals, level: u32) -> f64 {
        let mut value = self.base + f64::from(level) * self.per_level;
        for (stat, coefficient) in self.terms.iter() {
            value += totals.get(stat) * coefficient;
        }
        if let Some(cap) = self.cap {
            value = value.min(cap);
        }
        if let Some(floor) = self.floor {
            value = value.max(floor);
        }
        value
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if let (Some(floor), Some(cap)) = (self.floor, self.cap) {
            if floor > cap {
                return Err(ConfigError::Validation(format!(
                    "derived.{name}: floor ({floor}) exceeds cap ({cap})"
                )));
            }
        }
        Ok(())
    }
}

/// One formula per derived attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivedConfig {
    pub max_health: LinearFormula,
    pub max_mana: LinearFormula,
    pub crit_chance: LinearFormula,
    pub crit_damage_bonus: LinearFormula,
    pub evasion_chance: LinearFormula,
    pub physical_reduction: LinearFormula,
    pub magical_reduction: LinearFormula,
}

impl Default for DerivedConfig {
    fn default() -> Self {
        DerivedConfig {
            max_health: LinearFormula::new(0.0).with_term(Stat::Health, 1.0),
            max_mana: LinearFormula::new(0.0).with_term(Stat::Intelligence, 1.0),
            crit_chance: LinearFormula::new(0.0)
                .with_term(Stat::CritChance, 0.01)
                .with_floor(0.0)
                .with_cap(1.0),
            crit_damage_bonus: LinearFormula::new(1.0)
                .with_term(Stat::CritDamage, 0.01)
                .with_floor(1.0),
            evasion_chance: LinearFormula::new(0.0)
                .with_term(Stat::Evasion, 0.01)
                .with_floor(0.0)
                .with_cap(0.6),
            physical_reduction: LinearFormula::new(0.0)
                .with_term(Stat::Defense, 0.002)
                .with_floor(0.0)
                .with_cap(0.75),
            magical_reduction: LinearFormula::new(0.0)
                .with_term(Stat::TrueDefense, 0.002)
                .with_floor(0.0)
                .with_cap(0.75),
        }
    }
}

impl DerivedConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.max_health.validate("max_health")?;
        self.max_mana.validate("max_mana")?;
        self.crit_chance.validate("crit_chance")?;
        self.crit_damage_bonus.validate("crit_damage_bonus")?;
        self.evasion_chance.validate("evasion_chance")?;
        self.physical_reduction.validate("physical_reduction")?;
        self.magical_reduction.validate("magical_reduction")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(entries: &[(Stat, f64)]) -> StatTotals {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_linear_terms_and_level() {
        let formula = LinearFormula::new(50.0)
            .with_term(Stat::Health, 2.0)
            .with_per_level(5.0);
        let value = formula.evaluate(&totals(&[(Stat::Health, 10.0)]), 3);
        assert!((value - 85.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cap_is_a_min() {
        let formula = LinearFormula::new(0.0).with_term(Stat::Defense, 0.01).with_cap(0.5);
        assert!((formula.evaluate(&totals(&[(Stat::Defense, 30.0)]), 1) - 0.3).abs() < 1e-12);
        assert!((formula.evaluate(&totals(&[(Stat::Defense, 300.0)]), 1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_floor_applies_to_negative_inputs() {
        let formula = LinearFormula::new(0.0).with_term(Stat::Evasion, 0.01).with_floor(0.0);
        assert!(formula.evaluate(&totals(&[(Stat::Evasion, -50.0)]), 1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_floor_above_cap() {
        let mut config = DerivedConfig::default();
        config.crit_chance = LinearFormula::new(0.0).with_floor(0.9).with_cap(0.1);
        assert!(config.validate().is_err());
    }
}
