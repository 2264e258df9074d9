//! Engine configuration: derived-attribute formulas and runtime tuning
//!
//! The whole bundle is plain data. It is owned by whoever drives the engine
//! and passed by reference; reloading means building a new `EngineConfig` and
//! handing it to `update_runtime_config`.

mod constants;
mod formulas;

pub use constants::{
    AbilitySettings, CombatSettings, GatheringSettings, MovementSettings, ProfileDefaults,
};
pub use formulas::{DerivedConfig, LinearFormula};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error loading engine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path}': {error}")]
    Io { error: std::io::Error, path: PathBuf },
    #[error("Parse error in '{path}': {error}")]
    Parse { error: toml::de::Error, path: PathBuf },
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Read and deserialize a TOML file
pub(crate) fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
        error,
        path: path.to_path_buf(),
    })?;
    toml::from_str(&content).map_err(|error| ConfigError::Parse {
        error,
        path: path.to_path_buf(),
    })
}

/// Deserialize a TOML string
pub(crate) fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|error| ConfigError::Parse {
        error,
        path: PathBuf::from("<inline>"),
    })
}

/// Every coefficient the engine reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub profile: ProfileDefaults,
    #[serde(default)]
    pub derived: DerivedConfig,
    #[serde(default)]
    pub movement: MovementSettings,
    #[serde(default)]
    pub combat: CombatSettings,
    #[serde(default)]
    pub ability: AbilitySettings,
    #[serde(default)]
    pub gathering: GatheringSettings,
}

impl EngineConfig {
    /// Load and validate a config file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let config: EngineConfig = load_toml(path)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Parse and validate config from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = parse_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no formula can make sense of
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.derived.validate()?;

        let m = &self.movement;
        if m.min_walk_speed > m.max_walk_speed {
            return Err(ConfigError::Validation(format!(
                "movement.min_walk_speed ({}) exceeds movement.max_walk_speed ({})",
                m.min_walk_speed, m.max_walk_speed
            )));
        }
        if self.combat.max_attack_speed < 0.0 {
            return Err(ConfigError::Validation(
                "combat.max_attack_speed must not be negative".to_string(),
            ));
        }
        let a = &self.ability;
        if !(0.0..=1.0).contains(&a.minimum_mana_cost_multiplier) {
            return Err(ConfigError::Validation(format!(
                "ability.minimum_mana_cost_multiplier ({}) must be within [0, 1]",
                a.minimum_mana_cost_multiplier
            )));
        }
        if a.minimum_cooldown_seconds < 0.0 || a.minimum_mana_cost < 0.0 {
            return Err(ConfigError::Validation(
                "ability minimums must not be negative".to_string(),
            ));
        }
        if self.gathering.minimum_gather_delay_seconds < 0.0 {
            return Err(ConfigError::Validation(
                "gathering.minimum_gather_delay_seconds must not be negative".to_string(),
            ));
        }
        if self.profile.max_level == 0 {
            return Err(ConfigError::Validation("profile.max_level must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stat;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = EngineConfig::parse(
            r#"
[gathering]
mining_speed_haste_per_tier = 40.0
mining_speed_max_haste_tier = 5
"#,
        )
        .unwrap();
        assert!((config.gathering.mining_speed_haste_per_tier - 40.0).abs() < f64::EPSILON);
        assert_eq!(config.gathering.mining_speed_max_haste_tier, 5);
        assert_eq!(config.movement, MovementSettings::default());
        assert_eq!(config.derived, DerivedConfig::default());
    }

    #[test]
    fn test_parse_full_sections() {
        let toml = r#"
[profile]
default_stat_value = 0.0
max_level = 50

[profile.overrides]
health = 120.0
intelligence = 80.0
luck = 5.0

[derived.max_health]
base = 20.0
per_level = 4.0
terms = { health = 1.0 }

[derived.physical_reduction]
terms = { defense = 0.01 }
cap = 0.8

[movement]
base_walk_speed = 0.25

[ability]
minimum_cooldown_seconds = 0.5
"#;
        let config = EngineConfig::parse(toml).unwrap();
        assert_eq!(config.profile.max_level, 50);
        // "luck" is not a stat and is skipped; the other built-in overrides stay
        assert_eq!(config.profile.overrides.len(), 6);
        assert!((config.profile.overrides.get(Stat::Health) - 120.0).abs() < f64::EPSILON);
        assert!((config.profile.overrides.get(Stat::Intelligence) - 80.0).abs() < f64::EPSILON);
        assert!((config.profile.overrides.get(Stat::Speed) - 100.0).abs() < f64::EPSILON);
        assert!((config.derived.max_health.base - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.derived.physical_reduction.cap, Some(0.8));
        assert!((config.movement.base_walk_speed - 0.25).abs() < f64::EPSILON);
        assert!((config.ability.minimum_cooldown_seconds - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validation_rejects_inverted_walk_speed() {
        let err = EngineConfig::parse(
            r#"
[movement]
min_walk_speed = 0.9
max_walk_speed = 0.1
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"[combat]\nbase_attack_speed = 3.0\n").unwrap();

        let config = EngineConfig::load_from_path(&path).unwrap();
        assert!((config.combat.base_attack_speed - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        match EngineConfig::load_from_path(&path) {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected IO error, got {:?}", other),
        }
    }
}
