//! runtime_core - Live runtime for stat profiles
//!
//! This library provides:
//! - EffectManager: status effect apply/tick/expire against the driver clock
//! - RuntimeSyncService: publishes changed derived attributes to a LiveWorld
//! - ProfileStore: profile persistence (in-memory and JSON files)
//! - SessionHost: non-blocking load/save around the driver
//! - Engine: one owner stepping effects, regeneration and sync in order
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use runtime_core::{Engine, SimulatedWorld, StatModifierEffect};
//! use stat_core::{EngineConfig, EntityId, StatProfile, Timestamp};
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! let id = EntityId::new_v4();
//! engine.admit(StatProfile::new(id, "Steve", engine.config()));
//!
//! let mut world = SimulatedWorld::new();
//! world.spawn(id);
//!
//! let slow = StatModifierEffect::slow(20.0, Duration::from_millis(50));
//! engine.apply_effect(id, Box::new(slow), Timestamp::ZERO).unwrap();
//! engine.step(Timestamp::from_millis(100), Duration::from_millis(100), &mut world);
//! assert!(!engine.has_effect(id, "slow", Timestamp::from_millis(100)));
//! ```

pub mod effect;
pub mod engine;
pub mod error;
pub mod live;
pub mod registry;
pub mod session;
pub mod store;
pub mod sync;

pub use effect::{
    ActiveEffect, EffectContext, EffectManager, PeriodicEffect, PeriodicKind, StatModifierEffect,
    StatusEffect, TickReport,
};
pub use engine::{Engine, StepReport};
pub use error::{EffectError, StoreError, WorldError};
pub use live::{Channel, LiveWorld, SimulatedWorld};
pub use registry::ProfileRegistry;
pub use session::SessionHost;
pub use store::{InMemoryProfileStore, JsonProfileStore, ProfileStore};
pub use sync::{DerivedSnapshot, RuntimeSyncService, SyncError, SyncReport, SyncSummary};
