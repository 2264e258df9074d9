//! Boundary to the live representation of characters.
//!
//! The engine never owns the live world; it reads health and validity from it
//! and pushes derived values onto its channels through [`LiveWorld`].

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use stat_core::EntityId;

use crate::error::WorldError;

/// A writable value on a live character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    MaxHealth,
    Health,
    MovementSpeed,
    AttackSpeed,
    Haste,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::MaxHealth => "max_health",
            Channel::Health => "health",
            Channel::MovementSpeed => "movement_speed",
            Channel::AttackSpeed => "attack_speed",
            Channel::Haste => "haste",
        };
        f.write_str(name)
    }
}

/// Readable/writable channels plus identity and validity queries
pub trait LiveWorld {
    /// Whether the identity is connected and synchronizable
    fn is_online(&self, id: EntityId) -> bool;

    /// Whether the identity resolves to a live, non-dead entity
    fn is_alive(&self, id: EntityId) -> bool;

    fn health(&self, id: EntityId) -> Option<f64>;

    fn max_health(&self, id: EntityId) -> Option<f64>;

    fn set_health(&mut self, id: EntityId, value: f64) -> Result<(), WorldError>;

    fn set_max_health(&mut self, id: EntityId, value: f64) -> Result<(), WorldError>;

    fn set_movement_speed(&mut self, id: EntityId, value: f64) -> Result<(), WorldError>;

    fn set_attack_speed(&mut self, id: EntityId, value: f64) -> Result<(), WorldError>;

    /// `None` removes haste
    fn set_haste(&mut self, id: EntityId, amplifier: Option<u8>) -> Result<(), WorldError>;
}

// ============================================================================
// SimulatedWorld
// ============================================================================

/// State of one entity in a [`SimulatedWorld`]
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedEntity {
    pub online: bool,
    pub alive: bool,
    pub health: f64,
    pub max_health: f64,
    pub movement_speed: f64,
    pub attack_speed: f64,
    pub haste: Option<u8>,
}

impl Default for SimulatedEntity {
    fn default() -> Self {
        SimulatedEntity {
            online: true,
            alive: true,
            health: 20.0,
            max_health: 20.0,
            movement_speed: 0.1,
            attack_speed: 4.0,
            haste: None,
        }
    }
}

/// A recorded channel write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelWrite {
    pub entity: EntityId,
    pub channel: Channel,
}

/// In-memory live world that records every channel write
#[derive(Debug, Default)]
pub struct SimulatedWorld {
    entities: HashMap<EntityId, SimulatedEntity>,
    writes: Vec<ChannelWrite>,
    rejected: HashSet<EntityId>,
}

impl SimulatedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, id: EntityId) -> &mut SimulatedEntity {
        self.entities.entry(id).or_default()
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<SimulatedEntity> {
        self.entities.remove(&id)
    }

    pub fn kill(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.alive = false;
            entity.health = 0.0;
        }
    }

    pub fn set_online(&mut self, id: EntityId, online: bool) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.online = online;
        }
    }

    /// Damage applied by something outside the engine
    pub fn damage(&mut self, id: EntityId, amount: f64) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.health = (entity.health - amount).max(0.0);
        }
    }

    /// Make every subsequent write to `id` fail
    pub fn reject_writes_for(&mut self, id: EntityId) {
        self.rejected.insert(id);
    }

    pub fn entity(&self, id: EntityId) -> Option<&SimulatedEntity> {
        self.entities.get(&id)
    }

    pub fn writes(&self) -> &[ChannelWrite] {
        &self.writes
    }

    pub fn writes_for(&self, id: EntityId) -> Vec<Channel> {
        self.writes
            .iter()
            .filter(|w| w.entity == id)
            .map(|w| w.channel)
            .collect()
    }

    pub fn take_writes(&mut self) -> Vec<ChannelWrite> {
        std::mem::take(&mut self.writes)
    }

    fn write(
        &mut self,
        id: EntityId,
        channel: Channel,
        apply: impl FnOnce(&mut SimulatedEntity),
    ) -> Result<(), WorldError> {
        if self.rejected.contains(&id) {
            return Err(WorldError::Rejected {
                entity: id,
                channel,
                reason: "writes disabled".to_string(),
            });
        }
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(WorldError::UnknownEntity(id))?;
        apply(entity);
        self.writes.push(ChannelWrite { entity: id, channel });
        Ok(())
    }
}

impl LiveWorld for SimulatedWorld {
    fn is_online(&self, id: EntityId) -> bool {
        self.entities.get(&id).is_some_and(|e| e.online)
    }

    fn is_alive(&self, id: EntityId) -> bool {
        self.entities.get(&id).is_some_and(|e| e.alive)
    }

    fn health(&self, id: EntityId) -> Option<f64> {
        self.entities.get(&id).map(|e| e.health)
    }

    fn max_health(&self, id: EntityId) -> Option<f64> {
        self.entities.get(&id).map(|e| e.max_health)
    }

    fn set_health(&mut self, id: EntityId, value: f64) -> Result<(), WorldError> {
        self.write(id, Channel::Health, |e| e.health = value.clamp(0.0, e.max_health))
    }

    fn set_max_health(&mut self, id: EntityId, value: f64) -> Result<(), WorldError> {
        self.write(id, Channel::MaxHealth, |e| {
            e.max_health = value;
            e.health = e.health.min(value);
        })
    }

    fn set_movement_speed(&mut self, id: EntityId, value: f64) -> Result<(), WorldError> {
        self.write(id, Channel::MovementSpeed, |e| e.movement_speed = value)
    }

    fn set_attack_speed(&mut self, id: EntityId, value: f64) -> Result<(), WorldError> {
        self.write(id, Channel::AttackSpeed, |e| e.attack_speed = value)
    }

    fn set_haste(&mut self, id: EntityId, amplifier: Option<u8>) -> Result<(), WorldError> {
        self.write(id, Channel::Haste, |e| e.haste = amplifier)
    }
}
