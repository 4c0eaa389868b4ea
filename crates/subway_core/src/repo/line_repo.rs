//! Line repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the line aggregate together with its ordered line stations.
//! - Hydrate lines with their stations on every read path.
//!
//! # Invariants
//! - `lines.name` is unique; collisions surface as `RepoError::DuplicateName`.
//! - A line save writes the line row and replaces all of its line-station
//!   rows inside one immediate transaction.
//! - Line-station order is `position ASC`, the order they were added in.
//! - Deleting a line cascades to its line-station rows (`ON DELETE CASCADE`).

use super::error::{RepoError, RepoResult};
use super::parse_uuid;
use super::schema_guard::ensure_connection_ready;
use crate::model::line::{Line, LineId, LineStation};
use crate::model::station::Station;
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const LINE_SELECT_SQL: &str = "SELECT id, name, color FROM lines";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("stations", &["id", "name"]),
    ("lines", &["id", "name", "color", "created_at", "updated_at"]),
    (
        "line_stations",
        &[
            "id",
            "line_id",
            "station_id",
            "previous_station_id",
            "distance",
            "position",
        ],
    ),
];

/// Repository interface for the line aggregate.
pub trait LineRepository {
    /// Inserts a transient line or updates a persisted one, replacing its
    /// line stations. Returns the persisted line with identities assigned.
    fn save(&self, line: &Line) -> RepoResult<Line>;
    fn find_by_id(&self, id: LineId) -> RepoResult<Option<Line>>;
    /// Loads one line by unique name. Unknown names yield `Ok(None)`.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Line>>;
    /// Lists every line in insertion order.
    fn find_all(&self) -> RepoResult<Vec<Line>>;
    /// Deletes a persisted line and, through cascade, its line stations.
    fn delete(&self, line: &Line) -> RepoResult<()>;
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed line repository.
pub struct SqliteLineRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLineRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_SCHEMA)?;
        Ok(Self { conn })
    }

    fn write(&self, line: &mut Line) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let line_id = match line.id() {
            None => {
                let id = Uuid::new_v4();
                tx.execute(
                    "INSERT INTO lines (id, name, color) VALUES (?1, ?2, ?3);",
                    params![id.to_string(), line.name(), line.color()],
                )
                .map_err(|err| RepoError::from_write(err, "line", line.name()))?;
                line.assign_id(id);
                id
            }
            Some(id) => {
                let changed = tx
                    .execute(
                        "UPDATE lines
                         SET
                            name = ?2,
                            color = ?3,
                            updated_at = (strftime('%s', 'now') * 1000)
                         WHERE id = ?1;",
                        params![id.to_string(), line.name(), line.color()],
                    )
                    .map_err(|err| RepoError::from_write(err, "line", line.name()))?;
                if changed == 0 {
                    return Err(RepoError::NotFound { entity: "line", id });
                }
                id
            }
        };

        replace_line_stations(&tx, line_id, line.line_stations_mut())?;
        tx.commit()?;
        Ok(())
    }
}

impl LineRepository for SqliteLineRepository<'_> {
    fn save(&self, line: &Line) -> RepoResult<Line> {
        line.validate()?;
        ensure_stations_persisted(line)?;

        let mut saved = line.clone();
        match self.write(&mut saved) {
            Ok(()) => {
                info!(
                    "event=line_save module=repo status=ok mode={} line_stations={}",
                    if line.is_persisted() { "update" } else { "insert" },
                    saved.line_stations().len()
                );
                Ok(saved)
            }
            Err(err) => {
                warn!("event=line_save module=repo status=error error={err}");
                Err(err)
            }
        }
    }

    fn find_by_id(&self, id: LineId) -> RepoResult<Option<Line>> {
        let row = self
            .conn
            .query_row(
                &format!("{LINE_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                read_line_columns,
            )
            .optional()?;
        row.map(|columns| hydrate_line(self.conn, columns))
            .transpose()
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Line>> {
        let row = self
            .conn
            .query_row(
                &format!("{LINE_SELECT_SQL} WHERE name = ?1;"),
                [name.trim()],
                read_line_columns,
            )
            .optional()?;
        row.map(|columns| hydrate_line(self.conn, columns))
            .transpose()
    }

    fn find_all(&self) -> RepoResult<Vec<Line>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LINE_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut columns = Vec::new();
        while let Some(row) = rows.next()? {
            columns.push(read_line_columns(row)?);
        }

        columns
            .into_iter()
            .map(|columns| hydrate_line(self.conn, columns))
            .collect()
    }

    fn delete(&self, line: &Line) -> RepoResult<()> {
        let id = line.id().ok_or(RepoError::Transient("line"))?;
        let changed = self
            .conn
            .execute("DELETE FROM lines WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            warn!("event=line_delete module=repo status=error error_code=line_not_found");
            return Err(RepoError::NotFound { entity: "line", id });
        }
        info!("event=line_delete module=repo status=ok");
        Ok(())
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM lines;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative line count {count}")))
    }
}

struct LineColumns {
    id: String,
    name: String,
    color: String,
}

fn read_line_columns(row: &Row<'_>) -> rusqlite::Result<LineColumns> {
    Ok(LineColumns {
        id: row.get("id")?,
        name: row.get("name")?,
        color: row.get("color")?,
    })
}

fn hydrate_line(conn: &Connection, columns: LineColumns) -> RepoResult<Line> {
    let id = parse_uuid(&columns.id, "lines.id")?;
    let line_stations = load_line_stations(conn, &columns.id)?;
    Line::with_id(id, &columns.name, &columns.color, line_stations)
        .map_err(|err| RepoError::InvalidData(format!("line {id}: {err}")))
}

fn load_line_stations(conn: &Connection, line_id: &str) -> RepoResult<Vec<LineStation>> {
    let mut stmt = conn.prepare(
        "SELECT
            ls.id AS id,
            ls.distance AS distance,
            s.id AS station_id,
            s.name AS station_name,
            p.id AS previous_id,
            p.name AS previous_name
         FROM line_stations ls
         INNER JOIN stations s ON s.id = ls.station_id
         LEFT JOIN stations p ON p.id = ls.previous_station_id
         WHERE ls.line_id = ?1
         ORDER BY ls.position ASC;",
    )?;
    let mut rows = stmt.query([line_id])?;
    let mut line_stations = Vec::new();
    while let Some(row) = rows.next()? {
        line_stations.push(parse_line_station_row(row)?);
    }
    Ok(line_stations)
}

fn parse_line_station_row(row: &Row<'_>) -> RepoResult<LineStation> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "line_stations.id")?;

    let station = parse_station(row.get("station_id")?, row.get("station_name")?)?;
    let previous_station = match (
        row.get::<_, Option<String>>("previous_id")?,
        row.get::<_, Option<String>>("previous_name")?,
    ) {
        (Some(previous_id), Some(previous_name)) => {
            Some(parse_station(previous_id, previous_name)?)
        }
        _ => None,
    };

    LineStation::with_id(id, station, previous_station, row.get("distance")?)
        .map_err(|err| RepoError::InvalidData(format!("line station {id}: {err}")))
}

fn parse_station(id: String, name: String) -> RepoResult<Station> {
    let id = parse_uuid(&id, "stations.id")?;
    Station::with_id(id, &name)
        .map_err(|err| RepoError::InvalidData(format!("stations.name for {id}: {err}")))
}

fn ensure_stations_persisted(line: &Line) -> RepoResult<()> {
    for line_station in line.line_stations() {
        if !line_station.station().is_persisted() {
            return Err(RepoError::Transient("station"));
        }
        if let Some(previous) = line_station.previous_station() {
            if !previous.is_persisted() {
                return Err(RepoError::Transient("station"));
            }
        }
    }
    Ok(())
}

fn replace_line_stations(
    tx: &Transaction<'_>,
    line_id: LineId,
    line_stations: &mut [LineStation],
) -> RepoResult<()> {
    let line_id_text = line_id.to_string();
    tx.execute(
        "DELETE FROM line_stations WHERE line_id = ?1;",
        [line_id_text.as_str()],
    )?;

    for (position, line_station) in line_stations.iter_mut().enumerate() {
        let id = line_station.id().unwrap_or_else(Uuid::new_v4);
        let station_name = line_station.station().name().to_string();
        tx.execute(
            "INSERT INTO line_stations (
                id,
                line_id,
                station_id,
                previous_station_id,
                distance,
                position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                line_id_text.as_str(),
                line_station.station().id().map(|value| value.to_string()),
                line_station
                    .previous_station()
                    .and_then(Station::id)
                    .map(|value| value.to_string()),
                line_station.distance(),
                position as i64,
            ],
        )
        .map_err(|err| RepoError::from_write(err, "line station", &station_name))?;
        line_station.assign_id(id);
    }

    Ok(())
}
