//! Error types for the data access layer.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

/// Result alias for data layer operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors raised while opening the data layer.
///
/// Errors from individual reads and writes surface as
/// [`folio_core::StoreError`] or [`folio_core::MediaError`] instead.
#[derive(Debug)]
pub enum DataError {
    /// Connecting to the database failed.
    ConnectFailed {
        /// Underlying SQL error.
        source: sqlx::Error,
    },
    /// Migration execution failed.
    MigrationFailed {
        /// Underlying migration error.
        source: sqlx::migrate::MigrateError,
    },
    /// The media root could not be created.
    MediaRootUnavailable {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

impl Display for DataError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed { .. } => formatter.write_str("database connection failed"),
            Self::MigrationFailed { .. } => formatter.write_str("migration failed"),
            Self::MediaRootUnavailable { .. } => {
                formatter.write_str("media root could not be created")
            }
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ConnectFailed { source } => Some(source),
            Self::MigrationFailed { source } => Some(source),
            Self::MediaRootUnavailable { source, .. } => Some(source),
        }
    }
}
