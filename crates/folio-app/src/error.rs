//! # Design
//!
//! - Centralize application-level errors for bootstrap and the commands.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: folio_config::ConfigError,
    },
    /// Telemetry could not be initialised.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: folio_telemetry::TelemetryError,
    },
    /// The content store or media root could not be opened.
    #[error("data layer operation failed")]
    Data {
        /// Operation identifier.
        operation: &'static str,
        /// Source data error.
        source: folio_data::DataError,
    },
    /// The demo dataset could not be assembled.
    #[error("demo dataset could not be built")]
    Demo {
        /// Source demo error.
        source: folio_core::demo::DemoError,
    },
    /// The HTTP listener failed.
    #[error("http server failed")]
    Server {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
    /// Writing export output failed.
    #[error("io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// A document could not be serialised for export.
    #[error("export serialisation failed")]
    Encode {
        /// Path the document was destined for.
        path: PathBuf,
        /// Source JSON error.
        source: serde_json::Error,
    },
}

impl AppError {
    pub(crate) const fn config(operation: &'static str, source: folio_config::ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: folio_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn data(operation: &'static str, source: folio_data::DataError) -> Self {
        Self::Data { operation, source }
    }

    pub(crate) const fn server(operation: &'static str, source: io::Error) -> Self {
        Self::Server { operation, source }
    }

    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io {
            operation,
            path,
            source,
        }
    }
}
