use crate::config::EngineConfig;
use crate::profile::{StatProfile, EQUIPMENT_KEY};
use crate::types::StatMap;

/// Sums item bonuses during an equipment scan
///
/// The whole scan lands as a single `equipment` layer with one recalculation.
#[derive(Debug, Clone, Default)]
pub struct EquipmentScan {
    totals: StatMap,
    items: usize,
}

impl EquipmentScan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, bonuses: &StatMap) {
        self.totals.merge(bonuses);
        self.items += 1;
    }

    /// Add an item whose bonuses come from external data keyed by stat name
    pub fn add_named<I, K>(&mut self, item_id: &str, bonuses: I)
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let bonuses = StatMap::from_named(bonuses, item_id);
        self.add_item(&bonuses);
    }

    pub fn totals(&self) -> &StatMap {
        &self.totals
    }

    pub fn item_count(&self) -> usize {
        self.items
    }

    /// Replace the profile's equipment layer and recalculate
    pub fn install(self, profile: &mut StatProfile, config: &EngineConfig) {
        profile.set_layer(EQUIPMENT_KEY, &self.totals);
        profile.recalculate_derived_attributes(config);
        tracing::debug!(profile = %profile.id(), items = self.items, "equipment layer installed");
    }
}
