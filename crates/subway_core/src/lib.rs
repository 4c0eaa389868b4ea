//! Persistence core for subway lines and stations.
//!
//! Lines own an ordered sequence of line stations; stations are shared stops
//! with globally unique names. Everything is stored in SQLite.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::line::{Line, LineId, LineStation, LineStationId};
pub use model::station::{Station, StationId};
pub use model::ValidationError;
pub use repo::error::{RepoError, RepoResult};
pub use repo::line_repo::{LineRepository, SqliteLineRepository};
pub use repo::station_repo::{SqliteStationRepository, StationRepository};
pub use service::line_service::{LineService, LineServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
