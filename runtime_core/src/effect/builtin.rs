//! Effects shipped with the engine

use std::time::Duration;

use stat_core::{Stat, StatMap};

use super::{EffectContext, StatusEffect};
use crate::error::EffectError;

/// Buff or debuff that installs a stat layer while active
///
/// Deltas are scaled by potency times stacks.
#[derive(Debug, Clone)]
pub struct StatModifierEffect {
    key: String,
    modifiers: StatMap,
    duration: Option<Duration>,
    potency: f64,
}

impl StatModifierEffect {
    pub fn new(key: impl Into<String>, modifiers: StatMap, duration: Duration) -> Self {
        StatModifierEffect {
            key: key.into(),
            modifiers,
            duration: Some(duration),
            potency: 1.0,
        }
    }

    pub fn permanent(key: impl Into<String>, modifiers: StatMap) -> Self {
        StatModifierEffect {
            key: key.into(),
            modifiers,
            duration: None,
            potency: 1.0,
        }
    }

    pub fn with_potency(mut self, potency: f64) -> Self {
        self.potency = potency;
        self
    }

    /// Movement slow of `amount` speed points
    pub fn slow(amount: f64, duration: Duration) -> Self {
        Self::new("slow", StatMap::from([(Stat::Speed, -amount.abs())]), duration)
    }

    /// Eight seconds of offense at the cost of defense
    pub fn berserker_rage() -> Self {
        Self::new(
            "berserker_rage",
            StatMap::from([
                (Stat::Strength, 80.0),
                (Stat::AttackSpeed, 35.0),
                (Stat::Ferocity, 40.0),
                (Stat::CritDamage, 25.0),
                (Stat::Defense, -20.0),
            ]),
            Duration::from_secs(8),
        )
    }

    pub fn modifiers(&self) -> &StatMap {
        &self.modifiers
    }
}

impl StatusEffect for StatModifierEffect {
    fn key(&self) -> &str {
        &self.key
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn potency(&self) -> f64 {
        self.potency
    }

    fn on_apply(&mut self, ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
        let scale = ctx.potency * f64::from(ctx.stacks);
        ctx.install_layer(&self.modifiers.scaled(scale));
        Ok(())
    }

    fn on_expire(&mut self, ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
        ctx.clear_layer();
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodicKind {
    Heal,
    Damage,
}

/// Heals or damages by potency on every tick
#[derive(Debug, Clone)]
pub struct PeriodicEffect {
    key: String,
    kind: PeriodicKind,
    amount: f64,
    duration: Option<Duration>,
    interval: Duration,
}

impl PeriodicEffect {
    pub fn new(
        key: impl Into<String>,
        kind: PeriodicKind,
        amount: f64,
        duration: Option<Duration>,
        interval: Duration,
    ) -> Self {
        PeriodicEffect {
            key: key.into(),
            kind,
            amount,
            duration,
            interval,
        }
    }

    pub fn regeneration(amount: f64, duration: Duration, interval: Duration) -> Self {
        Self::new("regeneration", PeriodicKind::Heal, amount, Some(duration), interval)
    }

    pub fn poison(amount: f64, duration: Duration, interval: Duration) -> Self {
        Self::new("poison", PeriodicKind::Damage, amount, Some(duration), interval)
    }

    pub fn kind(&self) -> PeriodicKind {
        self.kind
    }
}

impl StatusEffect for PeriodicEffect {
    fn key(&self) -> &str {
        &self.key
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn tick_interval(&self) -> Option<Duration> {
        Some(self.interval)
    }

    fn potency(&self) -> f64 {
        self.amount
    }

    fn on_apply(&mut self, _ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
        Ok(())
    }

    fn on_tick(&mut self, ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
        let amount = ctx.potency * f64::from(ctx.stacks);
        let Some(profile) = ctx.profile.as_deref_mut() else {
            return Ok(());
        };
        match self.kind {
            PeriodicKind::Heal => {
                profile.heal(amount.max(0.0).round() as u64);
            }
            PeriodicKind::Damage => {
                profile.take_damage(amount);
            }
        }
        Ok(())
    }

    fn on_expire(&mut self, _ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stat_core::config::EngineConfig;
    use stat_core::{StatProfile, Timestamp};
    use uuid::Uuid;

    fn context<'a>(
        profile: &'a mut StatProfile,
        config: &'a EngineConfig,
        key: &'a str,
        potency: f64,
    ) -> EffectContext<'a> {
        EffectContext {
            target: profile.id(),
            now: Timestamp::ZERO,
            potency,
            stacks: 1,
            effect_key: key,
            config,
            profile: Some(profile),
        }
    }

    #[test]
    fn test_berserker_rage_layer() {
        let config = EngineConfig::default();
        let mut profile = StatProfile::new(Uuid::new_v4(), "Brute", &config);
        let mut rage = StatModifierEffect::berserker_rage();

        let mut ctx = context(&mut profile, &config, "berserker_rage", 1.0);
        rage.on_apply(&mut ctx).unwrap();
        assert!((profile.stat_value(Stat::Strength) - 80.0).abs() < f64::EPSILON);
        assert!((profile.stat_value(Stat::Defense) + 20.0).abs() < f64::EPSILON);
        assert!(profile.layer("status:berserker_rage").is_some());

        let mut ctx = context(&mut profile, &config, "berserker_rage", 1.0);
        rage.on_expire(&mut ctx).unwrap();
        assert!(profile.layer_keys().next().is_none());
    }

    #[test]
    fn test_potency_scales_modifiers() {
        let config = EngineConfig::default();
        let mut profile = StatProfile::new(Uuid::new_v4(), "Target", &config);
        let mut slow = StatModifierEffect::slow(20.0, Duration::from_secs(1)).with_potency(1.5);
        let potency = slow.potency();
        let mut ctx = context(&mut profile, &config, "slow", potency);
        slow.on_apply(&mut ctx).unwrap();
        assert!((profile.stat_value(Stat::Speed) - 70.0).abs() < f64::EPSILON);
        assert!((profile.derived().walk_speed - 0.14).abs() < 1e-12);
    }

    #[test]
    fn test_periodic_heal_and_damage() {
        let config = EngineConfig::default();
        let mut profile = StatProfile::new(Uuid::new_v4(), "Target", &config);
        let mut poison = PeriodicEffect::poison(7.5, Duration::from_secs(5), Duration::from_secs(1));
        let mut ctx = context(&mut profile, &config, "poison", 7.5);
        poison.on_tick(&mut ctx).unwrap();
        assert_eq!(profile.current_health(), 92);

        let mut regen = PeriodicEffect::regeneration(5.0, Duration::from_secs(5), Duration::from_secs(1));
        let mut ctx = context(&mut profile, &config, "regeneration", 5.0);
        regen.on_tick(&mut ctx).unwrap();
        assert_eq!(profile.current_health(), 97);
    }

    #[test]
    fn test_hooks_without_profile_are_noops() {
        let config = EngineConfig::default();
        let mut ctx = EffectContext {
            target: Uuid::new_v4(),
            now: Timestamp::ZERO,
            potency: 3.0,
            stacks: 1,
            effect_key: "poison",
            config: &config,
            profile: None,
        };
        let mut poison = PeriodicEffect::poison(3.0, Duration::from_secs(5), Duration::from_secs(1));
        poison.on_tick(&mut ctx).unwrap();
        assert!(!ctx.install_layer(&StatMap::from([(Stat::Speed, 1.0)])));
    }
}
