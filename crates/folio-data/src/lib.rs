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
#![allow(clippy::redundant_pub_crate)]

//! Persistence for Folio: the PostgreSQL content store with its embedded
//! migrations, and the local filesystem blob store for uploaded media.

pub mod blob;
pub mod content;
pub mod error;
mod sql;

pub use blob::LocalBlobStore;
pub use content::PgContentStore;
pub use error::{DataError, Result as DataResult};
