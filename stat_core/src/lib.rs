//! stat_core - Stat profiles and derived attributes for game entities
//!
//! This library provides:
//! - StatProfile: baseline stats, a modifier ledger, pools and cooldowns
//! - ModifierLedger: named per-source stat deltas summed into stat values
//! - Derived attribute formulas driven by a hot-swappable EngineConfig
//! - Skill cost/cooldown rules and fractional mana regeneration
//! - Helpers for the equipment, zone and pet layer owners
//!
//! # Quick Start
//!
//! ```rust
//! use stat_core::prelude::*;
//!
//! let config = EngineConfig::default();
//! let mut profile = StatProfile::new(EntityId::new_v4(), "Steve", &config);
//! profile.set_baseline(Stat::Defense, 10.0);
//!
//! profile.set_layer(EQUIPMENT_KEY, &StatMap::from([(Stat::Defense, 15.0)]));
//! profile.set_layer(zone_key("swamp"), &StatMap::from([(Stat::Defense, -5.0)]));
//! profile.recalculate_derived_attributes(&config);
//!
//! assert_eq!(profile.stat_value(Stat::Defense), 20.0);
//! ```

pub mod ability;
pub mod config;
pub mod derived;
pub mod prelude;
pub mod profile;
pub mod regen;
pub mod sources;
pub mod time;
pub mod types;

// Core API - what most users need
pub use profile::{ModifierLedger, StatProfile};
pub use types::{EntityId, Stat, StatMap, StatParseError, StatTotals};
pub use time::Timestamp;
pub use derived::DerivedAttributes;

// Configuration
pub use config::{ConfigError, EngineConfig};

pub use ability::{AbilityError, SkillCost};
pub use regen::ManaRegenerator;
