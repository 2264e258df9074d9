//! Skill mana costs and cooldowns

use crate::config::AbilitySettings;
use crate::profile::StatProfile;
use crate::time::{secs, Timestamp};
use crate::types::Stat;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Why a skill cannot be used right now
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AbilityError {
    #[error("not enough mana: need {required}, have {available}")]
    InsufficientMana { required: u64, available: u64 },
    #[error("'{skill_id}' is on cooldown for another {remaining:?}")]
    OnCooldown { skill_id: String, remaining: Duration },
}

/// Mana cost after intelligence and ability power reductions
pub fn effective_mana_cost(
    base_cost: f64,
    intelligence: f64,
    ability_power: f64,
    settings: &AbilitySettings,
) -> f64 {
    if base_cost <= 0.0 {
        return 0.0;
    }
    let reduction = intelligence * settings.mana_cost_reduction_per_intelligence_point
        + ability_power * settings.mana_cost_reduction_per_ability_power_point;
    let multiplier = (1.0 - reduction.max(0.0)).max(settings.minimum_mana_cost_multiplier);
    (base_cost * multiplier).max(settings.minimum_mana_cost)
}

/// Cooldown in seconds after attack speed and intelligence reductions
pub fn effective_cooldown(
    base_seconds: f64,
    attack_speed: f64,
    intelligence: f64,
    settings: &AbilitySettings,
) -> f64 {
    if base_seconds <= 0.0 {
        return 0.0;
    }
    let reduction = attack_speed * settings.cooldown_reduction_per_attack_speed_point
        + intelligence * settings.cooldown_reduction_per_intelligence_point;
    let reduced = base_seconds * (1.0 - reduction.max(0.0)).max(0.0);
    reduced.max(settings.minimum_cooldown_seconds)
}

/// Base cost and cooldown of a skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCost {
    pub skill_id: String,
    #[serde(default)]
    pub mana_cost: f64,
    #[serde(default)]
    pub cooldown_seconds: f64,
}

impl SkillCost {
    pub fn new(skill_id: impl Into<String>, mana_cost: f64, cooldown_seconds: f64) -> Self {
        SkillCost {
            skill_id: skill_id.into(),
            mana_cost,
            cooldown_seconds,
        }
    }

    /// Whole mana units this skill costs for `profile`
    pub fn mana_cost_for(&self, profile: &StatProfile, settings: &AbilitySettings) -> u64 {
        let cost = effective_mana_cost(
            self.mana_cost,
            profile.stat_value(Stat::Intelligence),
            profile.stat_value(Stat::AbilityPower),
            settings,
        );
        cost.ceil().max(0.0) as u64
    }

    pub fn cooldown_for(&self, profile: &StatProfile, settings: &AbilitySettings) -> Duration {
        secs(effective_cooldown(
            self.cooldown_seconds,
            profile.stat_value(Stat::AttackSpeed),
            profile.stat_value(Stat::Intelligence),
            settings,
        ))
    }

    pub fn can_use(
        &self,
        profile: &StatProfile,
        now: Timestamp,
        settings: &AbilitySettings,
    ) -> Result<(), AbilityError> {
        if profile.is_on_cooldown(&self.skill_id, now) {
            return Err(AbilityError::OnCooldown {
                skill_id: self.skill_id.clone(),
                remaining: profile.remaining_cooldown(&self.skill_id, now),
            });
        }
        let required = self.mana_cost_for(profile, settings);
        if profile.current_mana() < required {
            return Err(AbilityError::InsufficientMana {
                required,
                available: profile.current_mana(),
            });
        }
        Ok(())
    }

    /// Spend mana and start the cooldown
    pub fn use_skill(
        &self,
        profile: &mut StatProfile,
        now: Timestamp,
        settings: &AbilitySettings,
    ) -> Result<(), AbilityError> {
        self.can_use(profile, now, settings)?;
        let cost = self.mana_cost_for(profile, settings);
        let cooldown = self.cooldown_for(profile, settings);
        profile.consume_mana(cost);
        profile.set_cooldown(&self.skill_id, now, cooldown);
        tracing::debug!(
            profile = %profile.id(),
            skill = %self.skill_id,
            mana = cost,
            cooldown_ms = cooldown.as_millis() as u64,
            "skill used"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::profile::EQUIPMENT_KEY;
    use crate::types::StatMap;
    use uuid::Uuid;

    #[test]
    fn test_mana_cost_reduction() {
        let settings = AbilitySettings::default();
        // 100 int + 100 ap at 0.001 each = 20% off
        let cost = effective_mana_cost(50.0, 100.0, 100.0, &settings);
        assert!((cost - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_mana_cost_floors() {
        let settings = AbilitySettings::default();
        let cost = effective_mana_cost(50.0, 10_000.0, 0.0, &settings);
        assert!((cost - 10.0).abs() < 1e-9);
        let tiny = effective_mana_cost(2.0, 10_000.0, 0.0, &settings);
        assert!((tiny - 1.0).abs() < 1e-9);
        assert_eq!(effective_mana_cost(0.0, 0.0, 0.0, &settings), 0.0);
    }

    #[test]
    fn test_cooldown_reduction_and_floor() {
        let settings = AbilitySettings::default();
        let cd = effective_cooldown(10.0, 100.0, 0.0, &settings);
        assert!((cd - 8.0).abs() < 1e-9);
        let floored = effective_cooldown(1.0, 10_000.0, 0.0, &settings);
        assert!((floored - 0.2).abs() < 1e-9);
        assert_eq!(effective_cooldown(0.0, 0.0, 0.0, &settings), 0.0);
    }

    #[test]
    fn test_huge_configured_cooldown_saturates() {
        let config = EngineConfig::default();
        let mut profile = StatProfile::new(Uuid::new_v4(), "Caster", &config);
        let skill = SkillCost::new("ultimate", 0.0, 1e30);
        assert_eq!(skill.cooldown_for(&profile, &config.ability), Duration::MAX);

        skill.use_skill(&mut profile, Timestamp::from_millis(10), &config.ability).unwrap();
        assert!(profile.is_on_cooldown("ultimate", Timestamp::from_millis(u64::MAX - 1)));
    }

    #[test]
    fn test_use_skill_consumes_rounded_cost_and_starts_cooldown() {
        let config = EngineConfig::default();
        let mut profile = StatProfile::new(Uuid::new_v4(), "Caster", &config);
        let skill = SkillCost::new("fireball", 12.5, 3.0);
        let now = Timestamp::from_millis(5_000);

        // 100 int = 10% off: 11.25 rounds up to 12
        assert_eq!(skill.mana_cost_for(&profile, &config.ability), 12);
        skill.use_skill(&mut profile, now, &config.ability).unwrap();
        assert_eq!(profile.current_mana(), 88);
        assert_eq!(profile.cooldown_expiry("fireball"), Some(Timestamp::from_millis(8_000)));

        let err = skill.can_use(&profile, Timestamp::from_millis(6_000), &config.ability);
        assert!(matches!(err, Err(AbilityError::OnCooldown { .. })));
        assert!(skill.can_use(&profile, Timestamp::from_millis(8_000), &config.ability).is_ok());
    }

    #[test]
    fn test_can_use_rejects_insufficient_mana() {
        let config = EngineConfig::default();
        let mut profile = StatProfile::new(Uuid::new_v4(), "Caster", &config);
        profile.set_layer(EQUIPMENT_KEY, &StatMap::from([(Stat::AttackSpeed, 50.0)]));
        profile.set_current_mana(5);
        let skill = SkillCost::new("blink", 20.0, 1.0);
        match skill.can_use(&profile, Timestamp::ZERO, &config.ability) {
            Err(AbilityError::InsufficientMana { required, available }) => {
                assert_eq!(required, 18);
                assert_eq!(available, 5);
            }
            other => panic!("expected insufficient mana, got {:?}", other),
        }
    }
}
