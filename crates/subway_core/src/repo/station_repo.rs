//! Station repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist stations and assign their identity on first save.
//! - Look stations up by identity or unique name.
//!
//! # Invariants
//! - `stations.name` is unique; collisions surface as `RepoError::DuplicateName`.
//! - A station referenced by any line station cannot be deleted.

use super::error::{RepoError, RepoResult};
use super::parse_uuid;
use super::schema_guard::ensure_connection_ready;
use crate::model::station::{Station, StationId};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const STATION_SELECT_SQL: &str = "SELECT id, name FROM stations";

const REQUIRED_SCHEMA: &[(&str, &[&str])] =
    &[("stations", &["id", "name", "created_at", "updated_at"])];

/// Repository interface for station persistence.
pub trait StationRepository {
    /// Inserts a transient station or updates a persisted one.
    fn save(&self, station: &Station) -> RepoResult<Station>;
    fn find_by_id(&self, id: StationId) -> RepoResult<Option<Station>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Station>>;
    /// Lists every station in insertion order.
    fn find_all(&self) -> RepoResult<Vec<Station>>;
    /// Deletes a persisted station that no line references anymore.
    fn delete(&self, station: &Station) -> RepoResult<()>;
}

/// SQLite-backed station repository.
pub struct SqliteStationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStationRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_SCHEMA)?;
        Ok(Self { conn })
    }

    fn insert(&self, station: &Station) -> RepoResult<StationId> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO stations (id, name) VALUES (?1, ?2);",
                params![id.to_string(), station.name()],
            )
            .map_err(|err| RepoError::from_write(err, "station", station.name()))?;
        Ok(id)
    }

    fn update(&self, id: StationId, station: &Station) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE stations
                 SET
                    name = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![id.to_string(), station.name()],
            )
            .map_err(|err| RepoError::from_write(err, "station", station.name()))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "station",
                id,
            });
        }
        Ok(())
    }
}

impl StationRepository for SqliteStationRepository<'_> {
    fn save(&self, station: &Station) -> RepoResult<Station> {
        station.validate()?;

        let mut saved = station.clone();
        let result = match station.id() {
            None => self.insert(station).map(|id| saved.assign_id(id)),
            Some(id) => self.update(id, station),
        };

        match result {
            Ok(()) => {
                info!(
                    "event=station_save module=repo status=ok mode={}",
                    if station.is_persisted() { "update" } else { "insert" }
                );
                Ok(saved)
            }
            Err(err) => {
                warn!("event=station_save module=repo status=error error={err}");
                Err(err)
            }
        }
    }

    fn find_by_id(&self, id: StationId) -> RepoResult<Option<Station>> {
        let row = self
            .conn
            .query_row(
                &format!("{STATION_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                read_station_columns,
            )
            .optional()?;
        row.map(into_station).transpose()
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Station>> {
        let row = self
            .conn
            .query_row(
                &format!("{STATION_SELECT_SQL} WHERE name = ?1;"),
                [name.trim()],
                read_station_columns,
            )
            .optional()?;
        row.map(into_station).transpose()
    }

    fn find_all(&self) -> RepoResult<Vec<Station>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STATION_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut stations = Vec::new();
        while let Some(row) = rows.next()? {
            stations.push(into_station(read_station_columns(row)?)?);
        }
        Ok(stations)
    }

    fn delete(&self, station: &Station) -> RepoResult<()> {
        let id = station.id().ok_or(RepoError::Transient("station"))?;
        let changed = self
            .conn
            .execute("DELETE FROM stations WHERE id = ?1;", [id.to_string()])
            .map_err(|err| RepoError::from_write(err, "station", station.name()))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "station",
                id,
            });
        }
        info!("event=station_delete module=repo status=ok");
        Ok(())
    }
}

fn read_station_columns(row: &Row<'_>) -> rusqlite::Result<(String, String)> {
    Ok((row.get("id")?, row.get("name")?))
}

fn into_station((id, name): (String, String)) -> RepoResult<Station> {
    let id = parse_uuid(&id, "stations.id")?;
    Station::with_id(id, &name)
        .map_err(|err| RepoError::InvalidData(format!("stations.name for {id}: {err}")))
}
