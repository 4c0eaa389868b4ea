//! Repository error type shared by station and line persistence.
//!
//! # Invariants
//! - Constraint failures reported by SQLite are classified into semantic
//!   variants (`DuplicateName`, `ReferenceViolation`) instead of leaking raw
//!   driver errors to callers.

use crate::db::DbError;
use crate::model::ValidationError;
use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from station/line persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Entity failed field-level validation before the write.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Entity with this identity does not exist.
    NotFound {
        entity: &'static str,
        id: Uuid,
    },
    /// Unique name constraint rejected the write.
    DuplicateName {
        entity: &'static str,
        name: String,
    },
    /// Foreign key constraint rejected the write or delete.
    ReferenceViolation {
        entity: &'static str,
        details: String,
    },
    /// Operation requires a persisted entity, got a transient one.
    Transient(&'static str),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid entity.
    InvalidData(String),
}

impl RepoError {
    /// Returns `true` for errors caused by storage integrity constraints.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            Self::DuplicateName { .. } | Self::ReferenceViolation { .. }
        )
    }

    /// Maps a write failure to a semantic error when SQLite reports a
    /// unique or foreign key constraint violation.
    pub(crate) fn from_write(err: rusqlite::Error, entity: &'static str, name: &str) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &err {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE => {
                    return Self::DuplicateName {
                        entity,
                        name: name.to_string(),
                    };
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return Self::ReferenceViolation {
                        entity,
                        details: message
                            .clone()
                            .unwrap_or_else(|| "FOREIGN KEY constraint failed".to_string()),
                    };
                }
                _ => {}
            }
        }
        err.into()
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::DuplicateName { entity, name } => {
                write!(f, "{entity} name already exists: `{name}`")
            }
            Self::ReferenceViolation { entity, details } => {
                write!(f, "{entity} reference violation: {details}")
            }
            Self::Transient(entity) => write!(f, "{entity} has not been saved yet"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
