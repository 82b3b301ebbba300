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

//! Content model and services shared by the Folio public site and the HQ
//! back-office.
//!
//! Layout: `model` (records and drafts), `store` (content store contract,
//! query builder, in-memory store), `settings` (key/value codec and typed
//! settings documents), `admin` (collection editing), `public` (read-only view
//! models), `session` (session provider contract and guard), `media` (upload
//! validation and blob store contract), `demo` (static demo dataset).

pub mod admin;
pub mod demo;
pub mod media;
pub mod model;
pub mod public;
pub mod session;
pub mod settings;
pub mod store;

pub use admin::{AdminError, CollectionAdmin, DeleteOutcome, Record};
pub use media::{BlobStore, MediaError, SharedBlobStore, UploadOptions};
pub use public::PublicSite;
pub use session::{Session, SessionGuard, SessionProvider, SessionScope, SharedSessionProvider};
pub use settings::{SettingsError, SettingsService};
pub use store::{
    BatchOutcome, ContentStore, MemoryStore, Query, Row, SharedContentStore, StoreError, Table,
};
