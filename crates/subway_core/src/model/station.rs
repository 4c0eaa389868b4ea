//! Station entity.
//!
//! # Invariants
//! - `name` is trimmed and non-blank; global uniqueness is enforced by storage.
//! - `id` is `None` until the station has been saved.

use super::{ensure_normalized_name, normalize_name, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for persisted stations.
pub type StationId = Uuid;

/// A named stop, globally unique by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    id: Option<StationId>,
    name: String,
}

impl Station {
    /// Creates a transient station.
    pub fn create(name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            name: normalize_name(name)?,
        })
    }

    /// Rebuilds a persisted station from a known identity.
    pub fn with_id(id: StationId, name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Some(id),
            name: normalize_name(name)?,
        })
    }

    pub fn id(&self) -> Option<StationId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Renames the station in place. Uniqueness is checked on save.
    pub fn update_name(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = normalize_name(name)?;
        Ok(())
    }

    /// Re-checks invariants, e.g. after deserialization.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_normalized_name("station name", &self.name)
    }

    /// Two stations are the same stop when both identities match, or, for
    /// transient stations, when names match.
    pub fn same_as(&self, other: &Station) -> bool {
        match (self.id, other.id) {
            (Some(left), Some(right)) => left == right,
            _ => self.name == other.name,
        }
    }

    pub(crate) fn assign_id(&mut self, id: StationId) {
        self.id = Some(id);
    }
}
