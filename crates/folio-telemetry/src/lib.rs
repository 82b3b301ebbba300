#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Telemetry primitives shared across the Folio workspace.
//!
//! Layout: `init.rs` (tracing subscriber install and log format),
//! `context.rs` (application span and task-local request context),
//! `layers.rs` (request-id layers), `metrics.rs` (Prometheus registry),
//! `error.rs` (`TelemetryError`).

pub mod context;
pub mod error;
pub mod init;
pub mod layers;
pub mod metrics;

pub use context::{
    GlobalContextGuard, current_request_id, record_app_mode, with_request_context,
};
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use layers::{propagate_request_id_layer, set_request_id_layer};
pub use metrics::{Metrics, MetricsSnapshot};
