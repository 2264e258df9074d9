//! In-memory ProfileStore for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use stat_core::{EntityId, StatProfile};

use super::ProfileStore;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<EntityId, StatProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn load(&self, id: EntityId) -> StoreResult<Option<StatProfile>> {
        let profiles = self.profiles.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(profiles.get(&id).cloned())
    }

    fn save(&self, profile: &StatProfile) -> StoreResult<()> {
        let mut profiles = self.profiles.write().map_err(|_| StoreError::LockPoisoned)?;
        profiles.insert(profile.id(), profile.clone());
        Ok(())
    }

    fn exists(&self, id: EntityId) -> bool {
        self.profiles
            .read()
            .map(|profiles| profiles.contains_key(&id))
            .unwrap_or(false)
    }

    fn delete(&self, id: EntityId) -> StoreResult<()> {
        let mut profiles = self.profiles.write().map_err(|_| StoreError::LockPoisoned)?;
        profiles.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stat_core::EngineConfig;
    use uuid::Uuid;

    #[test]
    fn test_save_load_delete() {
        let store = InMemoryProfileStore::new();
        let config = EngineConfig::default();
        let mut profile = StatProfile::new(Uuid::new_v4(), "Alex", &config);
        profile.set_currency(40);

        assert!(store.load(profile.id()).unwrap().is_none());
        store.save(&profile).unwrap();
        assert!(store.exists(profile.id()));
        assert_eq!(store.load(profile.id()).unwrap().unwrap().currency(), 40);

        store.delete(profile.id()).unwrap();
        assert!(store.is_empty());
    }
}
