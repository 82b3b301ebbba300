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

//! Folio application bootstrap wiring.
//!
//! Layout: `cli.rs` (command line), `bootstrap.rs` (service wiring and the
//! command runners), `export.rs` (static snapshot of the public site),
//! `error.rs` (application errors).

/// Service wiring and command runners.
pub mod bootstrap;
/// Command-line definition.
pub mod cli;
/// Application error type.
pub mod error;
/// Static export of the public site.
pub mod export;

pub use bootstrap::run_app;
pub use cli::{Cli, Command};
pub use error::{AppError, AppResult};
