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

//! Environment-driven configuration for the Folio server.
//!
//! Layout: `model.rs` (typed `ServerConfig`), `loader.rs` (environment
//! sources and validation), `secrets.rs` (argon2 hashing of the admin
//! password), `error.rs` (`ConfigError`).

pub mod error;
pub mod loader;
pub mod model;
pub mod secrets;

pub use error::{ConfigError, ConfigResult};
pub use loader::{EnvSource, ProcessEnv, load, load_from};
pub use model::{AdminCredentials, LogStyle, ServerConfig};
pub use secrets::{hash_secret, verify_secret};
