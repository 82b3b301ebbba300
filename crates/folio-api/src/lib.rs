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
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::redundant_pub_crate)]

//! HTTP surface for the Folio public site and the HQ back-office.
//!
//! Layout: `state.rs` (shared handler state), `session.rs` (credential-backed
//! session registry), `http/` (router, middleware, problem documents, public
//! and admin handlers, health, SSE).

pub mod http;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use http::router::ApiServer;
pub use session::SessionRegistry;
pub use state::{ApiState, ContentSource};
