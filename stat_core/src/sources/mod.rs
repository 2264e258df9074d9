//! Helpers for the subsystems that own ledger layers
//!
//! Each source writes only under its own key namespace and recalculates the
//! profile once after its writes.

mod equipment;
mod pet;
mod zone;

pub use equipment::EquipmentScan;
pub use pet::{dismiss_pet, summon_pet};
pub use zone::{enter_zone, leave_zone, zone_modifiers};
