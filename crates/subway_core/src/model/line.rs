//! Line aggregate and its owned line stations.
//!
//! # Responsibility
//! - Hold line identity, name and color.
//! - Own the ordered sequence of `LineStation` edges.
//!
//! # Invariants
//! - `name` is trimmed and non-blank; uniqueness is enforced by storage.
//! - `color` is stored uppercase, either a color word or `#RRGGBB`.
//! - A line station has a predecessor iff it has a distance, and the
//!   distance is strictly positive.
//! - Insertion order of line stations is the persisted order.

use super::station::Station;
use super::{ensure_normalized_name, normalize_name, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for persisted lines.
pub type LineId = Uuid;

/// Stable identifier for persisted line stations.
pub type LineStationId = Uuid;

static COLOR_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+$").expect("valid color word regex"));
static COLOR_HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color hex regex"));

/// One station's edge within a line: the station, the station before it and
/// the distance between the two.
///
/// A line station without predecessor marks where the line starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStation {
    id: Option<LineStationId>,
    station: Station,
    previous_station: Option<Station>,
    distance: Option<u32>,
}

impl LineStation {
    fn new(
        id: Option<LineStationId>,
        station: Station,
        previous_station: Option<Station>,
        distance: Option<u32>,
    ) -> Result<Self, ValidationError> {
        let line_station = Self {
            id,
            station,
            previous_station,
            distance,
        };
        line_station.validate()?;
        Ok(line_station)
    }

    /// Rebuilds a persisted line station.
    pub fn with_id(
        id: LineStationId,
        station: Station,
        previous_station: Option<Station>,
        distance: Option<u32>,
    ) -> Result<Self, ValidationError> {
        Self::new(Some(id), station, previous_station, distance)
    }

    pub fn id(&self) -> Option<LineStationId> {
        self.id
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn previous_station(&self) -> Option<&Station> {
        self.previous_station.as_ref()
    }

    pub fn distance(&self) -> Option<u32> {
        self.distance
    }

    /// Returns `true` for the edge that starts a line.
    pub fn is_start(&self) -> bool {
        self.previous_station.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.station.validate()?;
        match (&self.previous_station, self.distance) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(ValidationError::DistanceWithoutPreviousStation),
            (Some(_), None) => Err(ValidationError::PreviousStationWithoutDistance),
            (Some(_), Some(0)) => Err(ValidationError::ZeroDistance),
            (Some(previous), Some(_)) => {
                previous.validate()?;
                if previous.same_as(&self.station) {
                    return Err(ValidationError::SelfReference(
                        self.station.name().to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    pub(crate) fn assign_id(&mut self, id: LineStationId) {
        self.id = Some(id);
    }
}

/// A subway route, uniquely named, owning an ordered set of station links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    id: Option<LineId>,
    name: String,
    color: String,
    line_stations: Vec<LineStation>,
}

impl Line {
    /// Creates a transient line without stations.
    pub fn create(name: &str, color: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            name: normalize_name(name)?,
            color: normalize_color(color)?,
            line_stations: Vec::new(),
        })
    }

    /// Rebuilds a persisted line with its ordered line stations.
    pub fn with_id(
        id: LineId,
        name: &str,
        color: &str,
        line_stations: Vec<LineStation>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Some(id),
            name: normalize_name(name)?,
            color: normalize_color(color)?,
            line_stations,
        })
    }

    pub fn id(&self) -> Option<LineId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn line_stations(&self) -> &[LineStation] {
        &self.line_stations
    }

    /// Appends one edge to the end of this line.
    ///
    /// `previous_station` and `distance` go together: both set for a regular
    /// edge, both `None` for the starting station.
    pub fn add_line_station(
        &mut self,
        station: &Station,
        previous_station: Option<&Station>,
        distance: Option<u32>,
    ) -> Result<(), ValidationError> {
        let line_station =
            LineStation::new(None, station.clone(), previous_station.cloned(), distance)?;
        self.line_stations.push(line_station);
        Ok(())
    }

    /// Renames the line in place. Uniqueness is checked on save.
    pub fn update_name(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = normalize_name(name)?;
        Ok(())
    }

    pub fn update_color(&mut self, color: &str) -> Result<(), ValidationError> {
        self.color = normalize_color(color)?;
        Ok(())
    }

    /// Stations of this line in line-station order.
    pub fn stations(&self) -> Vec<&Station> {
        self.line_stations
            .iter()
            .map(LineStation::station)
            .collect()
    }

    pub fn contains_station(&self, name: &str) -> bool {
        let name = name.trim();
        self.line_stations
            .iter()
            .any(|line_station| line_station.station().name() == name)
    }

    /// Sum of all known edge distances.
    pub fn total_distance(&self) -> u64 {
        self.line_stations
            .iter()
            .filter_map(LineStation::distance)
            .map(u64::from)
            .sum()
    }

    /// Re-checks invariants on the whole aggregate.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_normalized_name("line name", &self.name)?;
        if normalize_color(&self.color)? != self.color {
            return Err(ValidationError::NotNormalized {
                field: "line color",
                value: self.color.clone(),
            });
        }
        for line_station in &self.line_stations {
            line_station.validate()?;
        }
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: LineId) {
        self.id = Some(id);
    }

    pub(crate) fn line_stations_mut(&mut self) -> &mut [LineStation] {
        &mut self.line_stations
    }
}

/// Normalizes a line color: trimmed and uppercased.
pub fn normalize_color(color: &str) -> Result<String, ValidationError> {
    let trimmed = color.trim();
    if COLOR_WORD_RE.is_match(trimmed) || COLOR_HEX_RE.is_match(trimmed) {
        return Ok(trimmed.to_ascii_uppercase());
    }
    Err(ValidationError::InvalidColor(color.to_string()))
}
