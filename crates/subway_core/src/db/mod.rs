//! Connection bootstrap for the subway store (`stations`, `lines`,
//! `line_stations`).
//!
//! # Responsibility
//! - Open file-backed or in-memory SQLite connections with foreign keys on,
//!   so deleting a line cascades to its line stations and a station still on
//!   a line cannot be deleted.
//! - Bring the schema up to the latest migration before any repository runs.
//!
//! # Invariants
//! - A database written by a newer build (`user_version` above the latest
//!   known migration) is refused with `DbError::UnsupportedSchemaVersion`.
//! - `SqliteStationRepository`/`SqliteLineRepository` only accept connections
//!   returned from `open_db`/`open_db_in_memory`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
