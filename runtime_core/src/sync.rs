//! Pushes derived attributes onto the live world, writing only what changed.

use std::collections::HashMap;

use serde::Serialize;
use stat_core::config::EngineConfig;
use stat_core::derived::{self, MIN_ATTACK_SPEED};
use stat_core::{EntityId, StatProfile};
use thiserror::Error;

use crate::error::WorldError;
use crate::live::{Channel, LiveWorld};
use crate::registry::ProfileRegistry;

/// Continuous channels within this distance count as unchanged
pub const SYNC_TOLERANCE: f64 = 1e-6;

/// Last values published for one identity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedSnapshot {
    pub max_health: Option<u64>,
    pub movement_speed: Option<f64>,
    pub attack_speed: Option<f64>,
    pub haste: Option<Option<u8>>,
    /// Live health right after the last sync
    pub published_health: Option<u64>,
    /// Profile health right after the last sync
    pub profile_health: Option<u64>,
}

/// Channels written by one sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub written: Vec<Channel>,
    /// The identity was offline or unknown and nothing was read or written
    pub skipped: bool,
}

impl SyncReport {
    fn skipped() -> Self {
        SyncReport {
            written: Vec::new(),
            skipped: true,
        }
    }

    pub fn wrote(&self, channel: Channel) -> bool {
        self.written.contains(&channel)
    }

    pub fn is_noop(&self) -> bool {
        self.written.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("sync of {entity} failed: {source}")]
pub struct SyncError {
    pub entity: EntityId,
    #[source]
    pub source: WorldError,
}

/// Totals for a `sync_all` pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub synced: usize,
    pub skipped: usize,
    pub failed: usize,
    pub writes: usize,
}

fn changed(previous: Option<f64>, value: f64) -> bool {
    previous.map_or(true, |p| (p - value).abs() > SYNC_TOLERANCE)
}

/// Diffs derived attributes against the last published snapshot
#[derive(Debug, Default)]
pub struct RuntimeSyncService {
    config: EngineConfig,
    snapshots: HashMap<EntityId, DerivedSnapshot>,
}

impl RuntimeSyncService {
    pub fn new(config: EngineConfig) -> Self {
        RuntimeSyncService {
            config,
            snapshots: HashMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Swap coefficients; takes effect on the next sync
    pub fn update_runtime_config(&mut self, config: EngineConfig) {
        tracing::debug!("runtime sync config updated");
        self.config = config;
    }

    pub fn snapshot(&self, id: EntityId) -> Option<&DerivedSnapshot> {
        self.snapshots.get(&id)
    }

    /// Forget what was published so the next sync writes every channel
    pub fn clear_cache(&mut self, id: EntityId) {
        self.snapshots.remove(&id);
    }

    pub fn clear_all(&mut self) {
        self.snapshots.clear();
    }

    /// Reconcile one profile with its live representation
    ///
    /// Unchanged channels are never written. The snapshot is updated per
    /// channel as writes succeed, so a failed write is retried next sync.
    pub fn sync_player(
        &mut self,
        profile: &mut StatProfile,
        world: &mut dyn LiveWorld,
    ) -> Result<SyncReport, SyncError> {
        let id = profile.id();
        if !world.is_online(id) {
            return Ok(SyncReport::skipped());
        }

        let fail = |source| SyncError { entity: id, source };
        let fresh = derived::calculate(&profile.totals(), profile.level(), &self.config);
        let snapshot = self.snapshots.entry(id).or_default();
        let first_sync = snapshot.max_health.is_none();
        let mut report = SyncReport::default();

        let external_health = world.health(id).map(|h| h.max(0.0).round() as u64);

        let max_health = profile.max_health();
        if snapshot.max_health != Some(max_health) {
            world.set_max_health(id, max_health as f64).map_err(fail)?;
            snapshot.max_health = Some(max_health);
            report.written.push(Channel::MaxHealth);
        }

        // Health: a change made out in the world since the last publish is
        // applied on top of whatever the profile did in the meantime
        let profile_health = profile.current_health();
        let reconciled = match (external_health, snapshot.published_health) {
            (Some(external), Some(published)) if !first_sync && external != published => {
                let merged = i128::from(profile_health) + i128::from(external) - i128::from(published);
                u64::try_from(merged.max(0)).unwrap_or(u64::MAX)
            }
            _ => profile_health,
        }
        .min(max_health);
        profile.set_current_health(reconciled);

        let live_health = world.health(id).map(|h| h.max(0.0).round() as u64);
        if live_health != Some(reconciled) {
            world.set_health(id, reconciled as f64).map_err(fail)?;
            report.written.push(Channel::Health);
        }
        snapshot.published_health = Some(reconciled);
        snapshot.profile_health = Some(profile.current_health());

        if changed(snapshot.movement_speed, fresh.walk_speed) {
            world.set_movement_speed(id, fresh.walk_speed).map_err(fail)?;
            snapshot.movement_speed = Some(fresh.walk_speed);
            report.written.push(Channel::MovementSpeed);
        }

        let attack_speed = fresh.attack_speed.max(MIN_ATTACK_SPEED);
        if changed(snapshot.attack_speed, attack_speed) {
            world.set_attack_speed(id, attack_speed).map_err(fail)?;
            snapshot.attack_speed = Some(attack_speed);
            report.written.push(Channel::AttackSpeed);
        }

        let haste = fresh.haste_amplifier();
        let haste_changed = match snapshot.haste {
            Some(previous) => previous != haste,
            None => haste.is_some(),
        };
        if haste_changed {
            world.set_haste(id, haste).map_err(fail)?;
            report.written.push(Channel::Haste);
        }
        snapshot.haste = Some(haste);

        if !report.is_noop() {
            tracing::debug!(entity = %id, channels = ?report.written, "synced runtime attributes");
        }
        Ok(report)
    }

    /// Sync every online profile in id order; one failure never stops the batch
    pub fn sync_all(&mut self, profiles: &mut ProfileRegistry, world: &mut dyn LiveWorld) -> SyncSummary {
        let mut summary = SyncSummary::default();
        for id in profiles.ids() {
            let Some(profile) = profiles.get_mut(&id) else {
                continue;
            };
            match self.sync_player(profile, world) {
                Ok(report) if report.skipped => summary.skipped += 1,
                Ok(report) => {
                    summary.synced += 1;
                    summary.writes += report.written.len();
                }
                Err(err) => {
                    tracing::error!(entity = %err.entity, error = %err, "runtime sync failed");
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}
