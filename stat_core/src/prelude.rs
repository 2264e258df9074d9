//! Prelude module for convenient imports
//!
//! ```rust
//! use stat_core::prelude::*;
//! ```

// Core types
pub use crate::profile::{
    pet_key, status_key, zone_key, ModifierLedger, StatProfile, EQUIPMENT_KEY, PET_PREFIX,
    STATUS_PREFIX, ZONE_PREFIX,
};
pub use crate::time::Timestamp;
pub use crate::types::{EntityId, Stat, StatMap, StatTotals};

// Derived attributes
pub use crate::derived::DerivedAttributes;

// Config
pub use crate::config::{ConfigError, EngineConfig};

// Skills and regeneration
pub use crate::ability::{AbilityError, SkillCost};
pub use crate::regen::ManaRegenerator;

// Layer owners
pub use crate::sources::{dismiss_pet, enter_zone, leave_zone, summon_pet, EquipmentScan};
