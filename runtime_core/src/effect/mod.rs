//! Status effect system
//!
//! Effects are trait objects with three lifecycle hooks (apply, tick, expire;
//! remove defaults to expire). The [`EffectManager`] owns every active
//! instance and drives them against the driver's clock. New gameplay effects
//! only implement [`StatusEffect`]; the manager never changes.

mod active;
pub mod builtin;
mod manager;

pub use active::ActiveEffect;
pub use builtin::{PeriodicEffect, PeriodicKind, StatModifierEffect};
pub use manager::{EffectManager, TickReport};

use std::fmt;
use std::time::Duration;

use stat_core::config::EngineConfig;
use stat_core::profile::status_key;
use stat_core::{EntityId, StatMap, StatProfile, Timestamp};

use crate::error::EffectError;

/// A gameplay effect with a bounded (or permanent) lifetime
pub trait StatusEffect: fmt::Debug + Send {
    /// Stable identifier; one instance per key per target
    fn key(&self) -> &str;

    /// `None` for permanent effects
    fn duration(&self) -> Option<Duration>;

    /// `None` for effects that never tick
    fn tick_interval(&self) -> Option<Duration> {
        None
    }

    fn potency(&self) -> f64 {
        1.0
    }

    fn on_apply(&mut self, ctx: &mut EffectContext<'_>) -> Result<(), EffectError>;

    fn on_tick(&mut self, _ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
        Ok(())
    }

    fn on_expire(&mut self, ctx: &mut EffectContext<'_>) -> Result<(), EffectError>;

    /// Early removal; same cleanup as expiry unless overridden
    fn on_remove(&mut self, ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
        self.on_expire(ctx)
    }
}

/// What a hook can see and touch
///
/// `profile` is `None` for targets without a stat profile (mobs and other
/// non-player entities).
pub struct EffectContext<'a> {
    pub target: EntityId,
    pub now: Timestamp,
    pub potency: f64,
    pub stacks: u32,
    pub effect_key: &'a str,
    pub config: &'a EngineConfig,
    pub profile: Option<&'a mut StatProfile>,
}

impl EffectContext<'_> {
    /// Ledger key owned by this effect
    pub fn layer_key(&self) -> String {
        status_key(self.effect_key)
    }

    /// Install this effect's layer and recalculate; false without a profile
    pub fn install_layer(&mut self, deltas: &StatMap) -> bool {
        let key = self.layer_key();
        match self.profile.as_deref_mut() {
            Some(profile) => {
                profile.set_layer(key, deltas);
                profile.recalculate_derived_attributes(self.config);
                true
            }
            None => false,
        }
    }

    /// Clear this effect's layer and recalculate; false if nothing was installed
    pub fn clear_layer(&mut self) -> bool {
        let key = self.layer_key();
        match self.profile.as_deref_mut() {
            Some(profile) => {
                let removed = profile.clear_layer(&key);
                if removed {
                    profile.recalculate_derived_attributes(self.config);
                }
                removed
            }
            None => false,
        }
    }
}
