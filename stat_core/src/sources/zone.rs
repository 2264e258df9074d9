use crate::config::EngineConfig;
use crate::profile::{zone_key, StatProfile};
use crate::types::{Stat, StatMap};
use std::collections::BTreeMap;

const STAT_PROPERTY_PREFIX: &str = "stat.";

/// Stat modifiers declared in a zone's property table
///
/// Only `stat.<name>` keys are read. Values may be numbers or numeric strings;
/// unknown stats and unparseable values are skipped with a warning.
pub fn zone_modifiers(zone_id: &str, properties: &BTreeMap<String, toml::Value>) -> StatMap {
    let mut modifiers = StatMap::new();
    for (key, value) in properties {
        let Some(name) = key.strip_prefix(STAT_PROPERTY_PREFIX) else {
            continue;
        };
        let stat = match name.parse::<Stat>() {
            Ok(stat) => stat,
            Err(err) => {
                tracing::warn!(zone = zone_id, property = %key, error = %err, "skipping zone modifier");
                continue;
            }
        };
        let amount = match value {
            toml::Value::Integer(i) => *i as f64,
            toml::Value::Float(f) => *f,
            toml::Value::String(s) => match s.trim().parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(zone = zone_id, property = %key, value = %s, "zone modifier is not numeric");
                    continue;
                }
            },
            other => {
                tracing::warn!(zone = zone_id, property = %key, kind = other.type_str(), "zone modifier is not numeric");
                continue;
            }
        };
        modifiers.add(stat, amount);
    }
    modifiers
}

/// Install a zone's layer and recalculate
pub fn enter_zone(profile: &mut StatProfile, zone_id: &str, modifiers: &StatMap, config: &EngineConfig) {
    profile.set_layer(zone_key(zone_id), modifiers);
    profile.recalculate_derived_attributes(config);
    tracing::debug!(profile = %profile.id(), zone = zone_id, "entered zone");
}

pub fn leave_zone(profile: &mut StatProfile, zone_id: &str, config: &EngineConfig) -> bool {
    let removed = profile.clear_layer(&zone_key(zone_id));
    if removed {
        profile.recalculate_derived_attributes(config);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn properties(toml: &str) -> BTreeMap<String, toml::Value> {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_parse_zone_properties() {
        let props = properties(
            r#"
"stat.defense" = -5
"stat.speed" = "12.5"
"stat.wisdom" = 3
"stat.ferocity" = true
"music" = "swamp_theme"
"#,
        );
        let modifiers = zone_modifiers("swamp", &props);
        assert_eq!(modifiers.len(), 2);
        assert!((modifiers.get(Stat::Defense) + 5.0).abs() < f64::EPSILON);
        assert!((modifiers.get(Stat::Speed) - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_enter_and_leave_zone() {
        let config = EngineConfig::default();
        let mut profile = StatProfile::new(Uuid::new_v4(), "Wanderer", &config);
        profile.set_baseline(Stat::Defense, 10.0);

        enter_zone(&mut profile, "crypt", &StatMap::from([(Stat::Defense, -5.0)]), &config);
        assert!((profile.stat_value(Stat::Defense) - 5.0).abs() < f64::EPSILON);
        assert!(profile.layer("zone:crypt").is_some());

        assert!(leave_zone(&mut profile, "crypt", &config));
        assert!(!leave_zone(&mut profile, "crypt", &config));
        assert!((profile.stat_value(Stat::Defense) - 10.0).abs() < f64::EPSILON);
    }
}
