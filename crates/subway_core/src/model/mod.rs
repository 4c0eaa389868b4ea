//! Subway domain model: stations, lines and the line stations joining them.
//!
//! # Responsibility
//! - Define the entities persisted by the repository layer.
//! - Enforce field-level invariants before anything reaches storage.
//!
//! # Invariants
//! - Entities start transient (`id() == None`); identity is assigned by the
//!   repository on first save and never changes afterwards.
//! - A `Line` exclusively owns its ordered `LineStation` collection.

pub mod line;
pub mod station;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-level invariant violations for stations, lines and line stations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty after trimming.
    BlankName,
    /// Color is neither a color word nor a `#RRGGBB` code.
    InvalidColor(String),
    /// Distance was given for a line station without a predecessor.
    DistanceWithoutPreviousStation,
    /// Predecessor was given without a distance to it.
    PreviousStationWithoutDistance,
    /// Distance to the predecessor must be strictly positive.
    ZeroDistance,
    /// A station cannot follow itself.
    SelfReference(String),
    /// Stored field differs from its normalized form (untrimmed name,
    /// lowercase color).
    NotNormalized { field: &'static str, value: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::InvalidColor(value) => {
                write!(f, "invalid color `{value}`; expected a color word or #RRGGBB")
            }
            Self::DistanceWithoutPreviousStation => {
                write!(f, "distance requires a previous station")
            }
            Self::PreviousStationWithoutDistance => {
                write!(f, "previous station requires a distance")
            }
            Self::ZeroDistance => write!(f, "distance must be greater than zero"),
            Self::SelfReference(name) => {
                write!(f, "station `{name}` cannot be its own previous station")
            }
            Self::NotNormalized { field, value } => {
                write!(f, "{field} `{value}` is not in normalized form")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn normalize_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName);
    }
    Ok(trimmed.to_string())
}

/// Checks a stored name is already trimmed and non-blank.
pub(crate) fn ensure_normalized_name(
    field: &'static str,
    name: &str,
) -> Result<(), ValidationError> {
    if normalize_name(name)? != name {
        return Err(ValidationError::NotNormalized {
            field,
            value: name.to_string(),
        });
    }
    Ok(())
}
