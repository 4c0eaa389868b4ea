//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define aggregate-oriented data access contracts (lines, stations).
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Write paths validate entities before any SQL mutation.
//! - Lookups by name return `Ok(None)` for unknown names instead of an error.
//! - Repositories refuse connections that are not fully migrated.

pub mod error;
pub mod line_repo;
mod schema_guard;
pub mod station_repo;

use error::{RepoError, RepoResult};
use uuid::Uuid;

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
