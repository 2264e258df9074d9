//! Profile persistence contracts and implementations.

mod json;
mod memory;

pub use json::JsonProfileStore;
pub use memory::InMemoryProfileStore;

use stat_core::{EntityId, StatProfile};

use crate::error::StoreResult;

/// Durable storage for stat profiles
///
/// Implementations are called from blocking tasks, never from the step path.
/// Session-only state (ledger, derived cache) is not persisted; callers
/// rehydrate loaded profiles.
pub trait ProfileStore: Send + Sync {
    /// `None` when the identity has never been saved
    fn load(&self, id: EntityId) -> StoreResult<Option<StatProfile>>;

    fn save(&self, profile: &StatProfile) -> StoreResult<()>;

    fn exists(&self, id: EntityId) -> bool;

    fn delete(&self, id: EntityId) -> StoreResult<()>;
}
