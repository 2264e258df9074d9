//! Live profile registry.

use std::collections::HashMap;

use stat_core::{EntityId, StatProfile};

/// Profiles admitted into the live world, keyed by identity.
///
/// Only the driver touches this, so there is no locking.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<EntityId, StatProfile>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a profile, returning any profile it replaced
    pub fn insert(&mut self, profile: StatProfile) -> Option<StatProfile> {
        self.profiles.insert(profile.id(), profile)
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<StatProfile> {
        self.profiles.remove(id)
    }

    pub fn get(&self, id: &EntityId) -> Option<&StatProfile> {
        self.profiles.get(id)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut StatProfile> {
        self.profiles.get_mut(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.profiles.contains_key(id)
    }

    /// Identities in ascending order
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.profiles.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StatProfile> {
        self.profiles.values_mut()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stat_core::EngineConfig;
    use uuid::Uuid;

    #[test]
    fn test_ids_are_sorted() {
        let config = EngineConfig::default();
        let mut registry = ProfileRegistry::new();
        let mut expected = Vec::new();
        for name in ["a", "b", "c", "d"] {
            let id = Uuid::new_v4();
            registry.insert(StatProfile::new(id, name, &config));
            expected.push(id);
        }
        expected.sort_unstable();
        assert_eq!(registry.ids(), expected);

        registry.remove(&expected[1]);
        expected.remove(1);
        assert_eq!(registry.ids(), expected);
    }
}
