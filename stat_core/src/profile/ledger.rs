//! ModifierLedger - named, replaceable stat deltas per source

use crate::types::{Stat, StatMap};
use std::collections::BTreeMap;

/// Layer key owned by the equipment scan
pub const EQUIPMENT_KEY: &str = "equipment";
/// Prefix for layers owned by status effects
pub const STATUS_PREFIX: &str = "status:";
/// Prefix for layers owned by zones
pub const ZONE_PREFIX: &str = "zone:";
/// Prefix for layers owned by pets
pub const PET_PREFIX: &str = "pet:";

pub fn status_key(effect_key: &str) -> String {
    format!("{STATUS_PREFIX}{effect_key}")
}

pub fn zone_key(zone_id: &str) -> String {
    format!("{ZONE_PREFIX}{zone_id}")
}

pub fn pet_key(pet_id: &str) -> String {
    format!("{PET_PREFIX}{pet_id}")
}

/// One delta table per source key
///
/// Aggregation is a plain sum over layers, walked in key order so the result
/// never depends on the order layers were written in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierLedger {
    layers: BTreeMap<String, StatMap>,
}

impl ModifierLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the layer for `key`
    ///
    /// Zero deltas are dropped. An empty result clears the key.
    pub fn set_layer(&mut self, key: impl Into<String>, deltas: &StatMap) {
        let key = key.into();
        let deltas = deltas.without_zeros();
        if deltas.is_empty() {
            self.layers.remove(&key);
        } else {
            self.layers.insert(key, deltas);
        }
    }

    /// Remove the layer for `key`, returning whether one was installed
    pub fn clear_layer(&mut self, key: &str) -> bool {
        self.layers.remove(key).is_some()
    }

    /// Remove every layer whose key starts with `prefix`
    pub fn clear_prefix(&mut self, prefix: &str) -> usize {
        let before = self.layers.len();
        self.layers.retain(|key, _| !key.starts_with(prefix));
        before - self.layers.len()
    }

    /// Sum of deltas for `stat` across every layer
    pub fn total(&self, stat: Stat) -> f64 {
        self.layers.values().map(|layer| layer.get(stat)).sum()
    }

    pub fn layer(&self, key: &str) -> Option<&StatMap> {
        self.layers.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.layers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
