//! Single-owner driver for one world's stat runtime.

use std::time::Duration;

use serde::Serialize;
use stat_core::{EngineConfig, EntityId, ManaRegenerator, StatProfile, Timestamp};

use crate::effect::{EffectManager, StatusEffect, TickReport};
use crate::error::EffectError;
use crate::live::LiveWorld;
use crate::registry::ProfileRegistry;
use crate::sync::{RuntimeSyncService, SyncSummary};

/// What one step did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepReport {
    pub effects: TickReport,
    pub mana_restored: u64,
    pub sync: SyncSummary,
}

/// Owns the profile registry, effect manager, regeneration and sync service
///
/// Everything that mutates a profile runs through here, one step at a time.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    profiles: ProfileRegistry,
    effects: EffectManager,
    regen: ManaRegenerator,
    sync: RuntimeSyncService,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine {
            sync: RuntimeSyncService::new(config.clone()),
            config,
            profiles: ProfileRegistry::new(),
            effects: EffectManager::new(),
            regen: ManaRegenerator::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    pub fn profile(&self, id: EntityId) -> Option<&StatProfile> {
        self.profiles.get(&id)
    }

    /// For equipment, zone, pet and skill collaborators
    pub fn profile_mut(&mut self, id: EntityId) -> Option<&mut StatProfile> {
        self.profiles.get_mut(&id)
    }

    pub fn effects(&self) -> &EffectManager {
        &self.effects
    }

    pub fn sync_service(&self) -> &RuntimeSyncService {
        &self.sync
    }

    /// Admit a loaded profile into the live world
    pub fn admit(&mut self, mut profile: StatProfile) {
        profile.recalculate_derived_attributes(&self.config);
        tracing::debug!(entity = %profile.id(), name = profile.name(), "profile admitted");
        if self.profiles.insert(profile).is_some() {
            tracing::warn!("admitted profile replaced an existing one");
        }
    }

    pub fn apply_effect(
        &mut self,
        target: EntityId,
        effect: Box<dyn StatusEffect>,
        now: Timestamp,
    ) -> Result<(), EffectError> {
        let profile = self.profiles.get_mut(&target);
        self.effects.apply_effect(target, effect, now, profile, &self.config)
    }

    pub fn remove_effect(&mut self, target: EntityId, key: &str, now: Timestamp) -> bool {
        let profile = self.profiles.get_mut(&target);
        self.effects.remove_effect(target, key, now, profile, &self.config)
    }

    pub fn has_effect(&self, target: EntityId, key: &str, now: Timestamp) -> bool {
        self.effects.has_effect(target, key, now)
    }

    /// Effects, then mana regeneration, then sync
    pub fn step(&mut self, now: Timestamp, elapsed: Duration, world: &mut dyn LiveWorld) -> StepReport {
        let effects = self.effects.tick(now, &*world, &mut self.profiles, &self.config);

        let mut mana_restored = 0;
        for profile in self.profiles.iter_mut() {
            mana_restored += self.regen.tick(profile, elapsed);
        }

        let sync = self.sync.sync_all(&mut self.profiles, world);
        StepReport {
            effects,
            mana_restored,
            sync,
        }
    }

    /// Swap coefficients and recalculate every live profile
    pub fn update_config(&mut self, config: EngineConfig) {
        for profile in self.profiles.iter_mut() {
            profile.recalculate_derived_attributes(&config);
        }
        self.sync.update_runtime_config(config.clone());
        self.config = config;
    }

    /// Remove an identity from the live world
    ///
    /// Effects are force-removed and the sync snapshot and regeneration
    /// remainder dropped before the profile is handed back for saving.
    pub fn teardown(&mut self, id: EntityId, now: Timestamp) -> Option<StatProfile> {
        let profile = self.profiles.get_mut(&id);
        let removed = self.effects.remove_all_effects(id, now, profile, &self.config);
        self.sync.clear_cache(id);
        self.regen.clear(id);
        let profile = self.profiles.remove(&id);
        tracing::debug!(entity = %id, effects = removed, "session torn down");
        profile
    }

    /// Force-expire every effect and drop all caches
    pub fn shutdown(&mut self, now: Timestamp) {
        self.effects.shutdown(now, &mut self.profiles, &self.config);
        self.sync.clear_all();
        self.regen.clear_all();
    }
}
