use crate::config::EngineConfig;
use crate::profile::{pet_key, StatProfile};
use crate::types::StatMap;

/// Install the bonuses of an active pet
pub fn summon_pet(profile: &mut StatProfile, pet_id: &str, bonuses: &StatMap, config: &EngineConfig) {
    profile.set_layer(pet_key(pet_id), bonuses);
    profile.recalculate_derived_attributes(config);
}

/// Returns whether the pet had a layer installed
pub fn dismiss_pet(profile: &mut StatProfile, pet_id: &str, config: &EngineConfig) -> bool {
    let removed = profile.clear_layer(&pet_key(pet_id));
    if removed {
        profile.recalculate_derived_attributes(config);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stat;
    use uuid::Uuid;

    #[test]
    fn test_summon_and_dismiss() {
        let config = EngineConfig::default();
        let mut profile = StatProfile::new(Uuid::new_v4(), "Tamer", &config);
        summon_pet(&mut profile, "tiger", &StatMap::from([(Stat::Strength, 8.0), (Stat::Health, 25.0)]), &config);
        assert!(profile.layer("pet:tiger").is_some());
        assert_eq!(profile.max_health(), 125);

        assert!(dismiss_pet(&mut profile, "tiger", &config));
        assert!(!dismiss_pet(&mut profile, "tiger", &config));
        assert_eq!(profile.max_health(), 100);
        assert!(profile.stat_value(Stat::Strength).abs() < f64::EPSILON);
    }
}
