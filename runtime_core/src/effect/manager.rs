//! Owns active effects and drives apply/tick/expire

use std::collections::BTreeMap;

use serde::Serialize;
use stat_core::config::EngineConfig;
use stat_core::{EntityId, StatProfile, Timestamp};

use super::{ActiveEffect, EffectContext, StatusEffect};
use crate::error::EffectError;
use crate::live::LiveWorld;
use crate::registry::ProfileRegistry;

/// What one `tick` call did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    /// (target, effect key) pairs that expired this tick
    pub expired: Vec<(EntityId, String)>,
    /// Number of `on_tick` hooks that ran successfully
    pub ticked: usize,
    /// Targets that could no longer be resolved and were dropped
    pub dropped_targets: Vec<EntityId>,
    /// Hook failures, logged and isolated to their effect
    pub failures: usize,
}

/// Active effects per target
///
/// One instance per effect key per target. Re-applying an active key refreshes
/// it: the old instance goes through `on_remove` and the new one starts a fresh
/// duration and tick schedule.
#[derive(Debug, Default)]
pub struct EffectManager {
    effects: BTreeMap<EntityId, Vec<ActiveEffect>>,
}

enum Hook {
    Apply,
    Tick,
    Expire,
    Remove,
}

fn run_hook(
    active: &mut ActiveEffect,
    hook: Hook,
    now: Timestamp,
    config: &EngineConfig,
    profile: Option<&mut StatProfile>,
) -> Result<(), EffectError> {
    let key = active.key().to_string();
    let target = active.target();
    let potency = active.potency();
    let stacks = active.stacks();
    let mut ctx = EffectContext {
        target,
        now,
        potency,
        stacks,
        effect_key: &key,
        config,
        profile,
    };
    let effect = active.effect_mut();
    match hook {
        Hook::Apply => effect.on_apply(&mut ctx),
        Hook::Tick => effect.on_tick(&mut ctx),
        Hook::Expire => effect.on_expire(&mut ctx),
        Hook::Remove => effect.on_remove(&mut ctx),
    }
}

impl EffectManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `effect` on `target`
    ///
    /// An `on_apply` failure leaves nothing recorded and is returned.
    pub fn apply_effect(
        &mut self,
        target: EntityId,
        effect: Box<dyn StatusEffect>,
        now: Timestamp,
        mut profile: Option<&mut StatProfile>,
        config: &EngineConfig,
    ) -> Result<(), EffectError> {
        let key = effect.key().to_string();
        if self.take_and_run(target, &key, Hook::Remove, now, profile.as_deref_mut(), config) {
            tracing::debug!(entity = %target, effect = %key, "refreshing active effect");
        }

        let mut active = ActiveEffect::new(effect, target, now);
        if let Err(err) = run_hook(&mut active, Hook::Apply, now, config, profile) {
            tracing::error!(entity = %target, effect = %key, error = %err, "effect failed to apply");
            return Err(err);
        }

        tracing::debug!(
            entity = %target,
            effect = %key,
            expires_at = ?active.expires_at(),
            "effect applied"
        );
        self.effects.entry(target).or_default().push(active);
        Ok(())
    }

    /// Advance every tracked effect to `now`
    pub fn tick(
        &mut self,
        now: Timestamp,
        world: &dyn LiveWorld,
        profiles: &mut ProfileRegistry,
        config: &EngineConfig,
    ) -> TickReport {
        let mut report = TickReport::default();
        let targets: Vec<EntityId> = self.effects.keys().copied().collect();

        for target in targets {
            if !world.is_alive(target) {
                let effects = self.effects.remove(&target).unwrap_or_default();
                tracing::debug!(entity = %target, effects = effects.len(), "target gone, expiring its effects");
                let mut profile = profiles.get_mut(&target);
                for mut active in effects {
                    if let Err(err) = run_hook(&mut active, Hook::Expire, now, config, profile.as_deref_mut()) {
                        tracing::error!(entity = %target, effect = %active.key(), error = %err, "expire hook failed");
                        report.failures += 1;
                    }
                    report.expired.push((target, active.key().to_string()));
                }
                report.dropped_targets.push(target);
                continue;
            }

            let Some(list) = self.effects.get_mut(&target) else {
                continue;
            };
            let mut profile = profiles.get_mut(&target);
            let mut i = 0;
            while i < list.len() {
                if list[i].is_expired(now) {
                    let mut active = list.remove(i);
                    if let Err(err) = run_hook(&mut active, Hook::Expire, now, config, profile.as_deref_mut()) {
                        tracing::error!(entity = %target, effect = %active.key(), error = %err, "expire hook failed");
                        report.failures += 1;
                    }
                    tracing::debug!(entity = %target, effect = %active.key(), "effect expired");
                    report.expired.push((target, active.key().to_string()));
                    continue;
                }

                if list[i].tick_due(now) {
                    let active = &mut list[i];
                    match run_hook(active, Hook::Tick, now, config, profile.as_deref_mut()) {
                        Ok(()) => {
                            active.advance_tick();
                            report.ticked += 1;
                        }
                        Err(err) => {
                            // left in place; retried next tick
                            tracing::error!(entity = %target, effect = %active.key(), error = %err, "tick hook failed");
                            report.failures += 1;
                        }
                    }
                }
                i += 1;
            }
            if list.is_empty() {
                self.effects.remove(&target);
            }
        }
        report
    }

    /// Remove one effect early; false if it was not active
    pub fn remove_effect(
        &mut self,
        target: EntityId,
        key: &str,
        now: Timestamp,
        profile: Option<&mut StatProfile>,
        config: &EngineConfig,
    ) -> bool {
        let removed = self.take_and_run(target, key, Hook::Remove, now, profile, config);
        if removed {
            tracing::debug!(entity = %target, effect = %key, "effect removed");
        }
        removed
    }

    /// Remove every effect on one target, returning how many there were
    pub fn remove_all_effects(
        &mut self,
        target: EntityId,
        now: Timestamp,
        mut profile: Option<&mut StatProfile>,
        config: &EngineConfig,
    ) -> usize {
        let effects = self.effects.remove(&target).unwrap_or_default();
        let count = effects.len();
        for mut active in effects {
            if let Err(err) = run_hook(&mut active, Hook::Remove, now, config, profile.as_deref_mut()) {
                tracing::error!(entity = %target, effect = %active.key(), error = %err, "remove hook failed");
            }
        }
        count
    }

    /// Force-expire everything on every target
    pub fn shutdown(&mut self, now: Timestamp, profiles: &mut ProfileRegistry, config: &EngineConfig) -> usize {
        let effects = std::mem::take(&mut self.effects);
        let mut count = 0;
        for (target, list) in effects {
            let mut profile = profiles.get_mut(&target);
            for mut active in list {
                if let Err(err) = run_hook(&mut active, Hook::Expire, now, config, profile.as_deref_mut()) {
                    tracing::error!(entity = %target, effect = %active.key(), error = %err, "expire hook failed during shutdown");
                }
                count += 1;
            }
        }
        tracing::debug!(effects = count, "effect manager shut down");
        count
    }

    /// Whether `key` is active on `target` and not past its expiry at `now`
    pub fn has_effect(&self, target: EntityId, key: &str, now: Timestamp) -> bool {
        self.active_effects(target)
            .iter()
            .any(|active| active.key() == key && !active.is_expired(now))
    }

    pub fn active_effect(&self, target: EntityId, key: &str) -> Option<&ActiveEffect> {
        self.active_effects(target).iter().find(|active| active.key() == key)
    }

    pub fn active_effects(&self, target: EntityId) -> &[ActiveEffect] {
        self.effects.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Targets holding an effect with `key`
    pub fn targets_with(&self, key: &str) -> Vec<EntityId> {
        self.effects
            .iter()
            .filter(|(_, list)| list.iter().any(|active| active.key() == key))
            .map(|(target, _)| *target)
            .collect()
    }

    pub fn tracked_targets(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.effects.keys().copied()
    }

    pub fn effect_count(&self) -> usize {
        self.effects.values().map(Vec::len).sum()
    }

    /// Detach the instance for `key` and run `hook` on it; failures are logged
    fn take_and_run(
        &mut self,
        target: EntityId,
        key: &str,
        hook: Hook,
        now: Timestamp,
        profile: Option<&mut StatProfile>,
        config: &EngineConfig,
    ) -> bool {
        let Some(list) = self.effects.get_mut(&target) else {
            return false;
        };
        let Some(index) = list.iter().position(|active| active.key() == key) else {
            return false;
        };
        let mut active = list.remove(index);
        if list.is_empty() {
            self.effects.remove(&target);
        }
        if let Err(err) = run_hook(&mut active, hook, now, config, profile) {
            tracing::error!(entity = %target, effect = %key, error = %err, "effect cleanup hook failed");
        }
        true
    }
}
