//! Fixtures shared by handler and router tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use folio_config::{AdminCredentials, hash_secret};
use folio_core::media::{BlobStore, MediaError, StoredObject, UploadOptions};
use folio_core::session::Session;
use folio_core::store::{StoreResult, Table};
use folio_core::{
    ContentStore, MemoryStore, Query, Row, SessionScope, SharedContentStore,
};
use folio_events::EventBus;
use folio_telemetry::Metrics;

use crate::session::SessionRegistry;
use crate::state::{ApiState, ContentSource};

pub(crate) const ADMIN_EMAIL: &str = "admin@example.com";
pub(crate) const ADMIN_PASSWORD: &str = "correct horse";

/// Blob store kept in memory.
#[derive(Default)]
pub(crate) struct MemoryBlobs {
    objects: Mutex<BTreeMap<String, (Vec<u8>, String)>>,
}

impl MemoryBlobs {
    pub(crate) fn content_type(&self, path: &str) -> Option<String> {
        self.objects
            .lock()
            .expect("lock")
            .get(path)
            .map(|(_, content_type)| content_type.clone())
    }

    pub(crate) fn len(&self) -> usize {
        self.objects.lock().expect("lock").len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobs {
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        options: &UploadOptions,
    ) -> Result<(), MediaError> {
        let mut objects = self.objects.lock().expect("lock");
        if objects.contains_key(path) && !options.upsert {
            return Err(MediaError::AlreadyExists {
                path: path.to_string(),
            });
        }
        objects.insert(
            path.to_string(),
            (bytes.to_vec(), options.content_type.clone()),
        );
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("http://media.test/{path}")
    }

    async fn list(&self) -> Result<Vec<StoredObject>, MediaError> {
        Ok(self
            .objects
            .lock()
            .expect("lock")
            .iter()
            .map(|(path, (bytes, _))| StoredObject {
                path: path.clone(),
                size: bytes.len() as u64,
                url: self.public_url(path),
            })
            .collect())
    }
}

/// Content store that records which tables were read.
pub(crate) struct ReadLog {
    inner: MemoryStore,
    reads: Mutex<Vec<Table>>,
}

impl ReadLog {
    pub(crate) fn over(inner: MemoryStore) -> Self {
        Self {
            inner,
            reads: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn reads_of(&self, table: Table) -> usize {
        self.reads
            .lock()
            .expect("lock")
            .iter()
            .filter(|read| **read == table)
            .count()
    }

    fn record(&self, query: &Query) {
        self.reads.lock().expect("lock").push(query.table());
    }
}

#[async_trait]
impl ContentStore for ReadLog {
    async fn select(&self, query: &Query) -> StoreResult<Vec<Row>> {
        self.record(query);
        self.inner.select(query).await
    }

    async fn count(&self, query: &Query) -> StoreResult<u64> {
        self.record(query);
        self.inner.count(query).await
    }

    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row> {
        self.inner.insert(table, row).await
    }

    async fn update(&self, query: &Query, patch: Row) -> StoreResult<Vec<Row>> {
        self.inner.update(query, patch).await
    }

    async fn delete(&self, query: &Query) -> StoreResult<u64> {
        self.inner.delete(query).await
    }

    async fn upsert(&self, table: Table, row: Row, conflict: &'static str) -> StoreResult<Row> {
        self.inner.upsert(table, row, conflict).await
    }
}

pub(crate) struct Fixture {
    pub(crate) state: Arc<ApiState>,
    pub(crate) blobs: Arc<MemoryBlobs>,
    pub(crate) events: EventBus,
    pub(crate) metrics: Metrics,
}

impl Fixture {
    /// State over the demo dataset.
    pub(crate) fn demo() -> Self {
        Self::over_store(Arc::new(
            folio_core::demo::demo_store().expect("demo store"),
        ))
    }

    /// Demo state over a custom store.
    pub(crate) fn over_store(store: SharedContentStore) -> Self {
        Self::over(store, Duration::from_secs(3600))
    }

    /// Demo state whose sessions last `ttl`.
    pub(crate) fn with_session_ttl(ttl: Duration) -> Self {
        Self::over(
            Arc::new(folio_core::demo::demo_store().expect("demo store")),
            ttl,
        )
    }

    /// State over an empty store.
    pub(crate) fn empty() -> Self {
        Self::over_store(Arc::new(MemoryStore::new()))
    }

    fn over(store: SharedContentStore, ttl: Duration) -> Self {
        let events = EventBus::with_capacity(64);
        let metrics = Metrics::new().expect("metrics");
        let admin = AdminCredentials {
            email: ADMIN_EMAIL.into(),
            password_hash: hash_secret(ADMIN_PASSWORD).expect("hash"),
        };
        let registry = SessionRegistry::new(
            Some(admin),
            ttl,
            events.clone(),
            metrics.clone(),
        );
        let scope = Arc::new(SessionScope::new(Arc::new(registry), events.clone()));
        let blobs = Arc::new(MemoryBlobs::default());
        let state = ApiState::new(
            ContentSource::Demo,
            store,
            blobs.clone(),
            scope,
            metrics.clone(),
        );
        Self {
            state: Arc::new(state),
            blobs,
            events,
            metrics,
        }
    }

    pub(crate) async fn sign_in(&self) -> Session {
        self.state
            .sessions
            .provider()
            .sign_in(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .expect("sign in")
    }
}
