//! Line use-case service.
//!
//! # Responsibility
//! - Register stations and open, extend, rename and close lines by name.
//! - Translate unknown names into explicit not-found errors.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Station connections only use stations that are already persisted.

use crate::model::line::Line;
use crate::model::station::Station;
use crate::model::ValidationError;
use crate::repo::error::RepoError;
use crate::repo::line_repo::LineRepository;
use crate::repo::station_repo::StationRepository;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from line service operations.
#[derive(Debug)]
pub enum LineServiceError {
    /// Input failed entity validation.
    InvalidInput(ValidationError),
    /// No line with this name exists.
    LineNotFound(String),
    /// No station with this name exists.
    StationNotFound(String),
    /// Repository-level failure.
    Repo(RepoError),
}

impl LineServiceError {
    /// Returns `true` when storage integrity constraints rejected the call.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::Repo(err) if err.is_integrity_violation())
    }
}

impl Display for LineServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::LineNotFound(name) => write!(f, "line not found: `{name}`"),
            Self::StationNotFound(name) => write!(f, "station not found: `{name}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LineServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for LineServiceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<RepoError> for LineServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidInput(err),
            other => Self::Repo(other),
        }
    }
}

/// Line service facade over line and station repositories.
pub struct LineService<L: LineRepository, S: StationRepository> {
    lines: L,
    stations: S,
}

impl<L: LineRepository, S: StationRepository> LineService<L, S> {
    /// Creates a service using the provided repository implementations.
    pub fn new(lines: L, stations: S) -> Self {
        Self { lines, stations }
    }

    /// Persists a new station.
    pub fn register_station(&self, name: &str) -> Result<Station, LineServiceError> {
        let station = Station::create(name)?;
        Ok(self.stations.save(&station)?)
    }

    /// Persists a new line without stations.
    pub fn open_line(&self, name: &str, color: &str) -> Result<Line, LineServiceError> {
        let line = Line::create(name, color)?;
        let saved = self.lines.save(&line)?;
        info!("event=line_open module=service status=ok");
        Ok(saved)
    }

    /// Appends a station to a line, optionally after a predecessor at the
    /// given distance.
    pub fn connect_station(
        &self,
        line_name: &str,
        station_name: &str,
        previous_station_name: Option<&str>,
        distance: Option<u32>,
    ) -> Result<Line, LineServiceError> {
        let mut line = self.require_line(line_name)?;
        let station = self.require_station(station_name)?;
        let previous_station = previous_station_name
            .map(|name| self.require_station(name))
            .transpose()?;

        line.add_line_station(&station, previous_station.as_ref(), distance)?;
        Ok(self.lines.save(&line)?)
    }

    pub fn find_line(&self, name: &str) -> Result<Option<Line>, LineServiceError> {
        Ok(self.lines.find_by_name(name)?)
    }

    pub fn list_lines(&self) -> Result<Vec<Line>, LineServiceError> {
        Ok(self.lines.find_all()?)
    }

    /// Renames a line, keeping its identity and stations.
    pub fn rename_line(
        &self,
        current_name: &str,
        new_name: &str,
    ) -> Result<Line, LineServiceError> {
        let mut line = self.require_line(current_name)?;
        line.update_name(new_name)?;
        Ok(self.lines.save(&line)?)
    }

    /// Deletes a line and its line stations.
    pub fn close_line(&self, name: &str) -> Result<(), LineServiceError> {
        let line = self.require_line(name)?;
        self.lines.delete(&line)?;
        info!("event=line_close module=service status=ok");
        Ok(())
    }

    /// Station names of a line in line-station order.
    pub fn station_names(&self, line_name: &str) -> Result<Vec<String>, LineServiceError> {
        let line = self.require_line(line_name)?;
        Ok(line
            .stations()
            .into_iter()
            .map(|station| station.name().to_string())
            .collect())
    }

    fn require_line(&self, name: &str) -> Result<Line, LineServiceError> {
        self.lines
            .find_by_name(name)?
            .ok_or_else(|| LineServiceError::LineNotFound(name.trim().to_string()))
    }

    fn require_station(&self, name: &str) -> Result<Station, LineServiceError> {
        self.stations
            .find_by_name(name)?
            .ok_or_else(|| LineServiceError::StationNotFound(name.trim().to_string()))
    }
}
