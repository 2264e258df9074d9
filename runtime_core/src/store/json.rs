//! File-based ProfileStore, one JSON document per identity.

use std::fs;
use std::path::{Path, PathBuf};

use stat_core::{EntityId, StatProfile};

use super::ProfileStore;
use crate::error::StoreResult;

/// Stores profiles as `<uuid>.json` under a base directory
///
/// Writes go to a temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    base_dir: PathBuf,
}

impl JsonProfileStore {
    pub fn new(base_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn profile_path(&self, id: EntityId) -> PathBuf {
        self.base_dir.join(format!("{id}.json"))
    }
}

impl ProfileStore for JsonProfileStore {
    fn load(&self, id: EntityId) -> StoreResult<Option<StatProfile>> {
        let path = self.profile_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        let profile: StatProfile = serde_json::from_slice(&bytes)?;
        tracing::debug!(entity = %id, path = %path.display(), "loaded profile");
        Ok(Some(profile))
    }

    fn save(&self, profile: &StatProfile) -> StoreResult<()> {
        let path = self.profile_path(profile.id());
        let temp_path = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(profile)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;
        tracing::debug!(entity = %profile.id(), path = %path.display(), "saved profile");
        Ok(())
    }

    fn exists(&self, id: EntityId) -> bool {
        self.profile_path(id).exists()
    }

    fn delete(&self, id: EntityId) -> StoreResult<()> {
        let path = self.profile_path(id);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use stat_core::{EngineConfig, Stat, Timestamp};
    use std::time::Duration;
    use tempfile::TempDir;
    use uuid::Uuid;

    #[test]
    fn test_round_trip_through_disk() {
        let dir = TempDir::new().unwrap();
        let store = JsonProfileStore::new(dir.path()).unwrap();
        let config = EngineConfig::default();

        let mut profile = StatProfile::new(Uuid::new_v4(), "Sam", &config);
        profile.set_baseline(Stat::Strength, 12.0);
        profile.set_level(7, &config);
        profile.take_damage(30.0);
        profile.set_cooldown("dash", Timestamp::from_millis(500), Duration::from_secs(4));
        store.save(&profile).unwrap();

        assert!(dir.path().join(format!("{}.json", profile.id())).exists());
        let mut loaded = store.load(profile.id()).unwrap().unwrap();
        loaded.rehydrate(&config);
        assert_eq!(loaded.name(), "Sam");
        assert_eq!(loaded.level(), 7);
        assert_eq!(loaded.current_health(), 70);
        assert!((loaded.baseline(Stat::Strength) - 12.0).abs() < f64::EPSILON);
        assert_eq!(loaded.cooldown_expiry("dash"), Some(Timestamp::from_millis(4_500)));
    }

    #[test]
    fn test_missing_profile_is_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonProfileStore::new(dir.path()).unwrap();
        assert!(store.load(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonProfileStore::new(dir.path()).unwrap();
        let id = Uuid::new_v4();
        fs::write(dir.path().join(format!("{id}.json")), b"{ not json").unwrap();
        assert!(matches!(store.load(id), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_delete() {
        let dir = TempDir::new().unwrap();
        let store = JsonProfileStore::new(dir.path()).unwrap();
        let profile = StatProfile::new(Uuid::new_v4(), "Sam", &EngineConfig::default());
        store.save(&profile).unwrap();
        store.delete(profile.id()).unwrap();
        assert!(!store.exists(profile.id()));
        store.delete(profile.id()).unwrap();
    }
}
