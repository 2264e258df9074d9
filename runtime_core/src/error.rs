//! Error types raised by the runtime layer.

use stat_core::EntityId;
use thiserror::Error;

use crate::live::Channel;

/// Errors raised by status effect hooks and the effect manager.
#[derive(Debug, Clone, Error)]
pub enum EffectError {
    #[error("effect '{effect}' failed: {reason}")]
    Hook { effect: String, reason: String },
}

/// Errors raised by a live world when a channel write is refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error("entity {0} is not present in the live world")]
    UnknownEntity(EntityId),

    #[error("write to {channel} on {entity} rejected: {reason}")]
    Rejected {
        entity: EntityId,
        channel: Channel,
        reason: String,
    },
}

/// Errors surfaced by profile store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("profile store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
