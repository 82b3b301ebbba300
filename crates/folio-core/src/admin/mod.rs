//! Admin editing of ordered content collections.
//!
//! # Design
//!
//! - One generic [`CollectionAdmin`] serves every collection page; per-type
//!   behavior (ordering, soft delete, visibility) lives in [`Record`] consts.
//! - Drafts are validated before the store is touched; an invalid draft never
//!   produces a write.
//! - Writes are last-write-wins with no version checks. Every successful write
//!   is announced on the event bus.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use chrono::Utc;
use folio_events::{ContentAction, Event, EventBus};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::{Draft, FieldIssue, ValidationErrors};
use crate::store::{Direction, Query, Row, SharedContentStore, StoreError, Table, from_row, to_row};

mod dashboard;
mod records;

pub use dashboard::{DashboardCounts, dashboard, repositories};

/// How a collection is listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    /// By `order_index`, editable through reorder.
    Indexed,
    /// By `created_at`, newest first.
    NewestFirst,
}

/// A content type editable through [`CollectionAdmin`].
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Backing table.
    const TABLE: Table;
    /// Human label used in log lines and error details.
    const LABEL: &'static str;
    /// Listing order.
    const ORDERING: ListOrder;
    /// Whether removal stamps `deleted_at` instead of deleting the row.
    const SOFT_DELETE: bool = false;
    /// Whether the record carries an `is_visible` flag.
    const HAS_VISIBILITY: bool = false;
    /// Form buffer type.
    type Draft: Draft;

    /// Row id.
    fn id(&self) -> Uuid;

    /// Bucket used for page statistics, if the page shows any.
    fn stat_key(&self) -> Option<String> {
        None
    }
}

/// Errors raised by admin collection operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The draft failed validation; nothing was written.
    #[error("draft failed validation")]
    Invalid(#[from] ValidationErrors),
    /// No live row has the requested id.
    #[error("record not found")]
    NotFound {
        /// Table addressed.
        table: Table,
        /// Requested id.
        id: Uuid,
    },
    /// The collection does not support the operation.
    #[error("operation not supported for this collection")]
    Unsupported {
        /// Table addressed.
        table: Table,
        /// Operation identifier.
        operation: &'static str,
    },
    /// The content store failed.
    #[error("content store operation failed")]
    Store {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: StoreError,
    },
}

fn store_error(operation: &'static str) -> impl FnOnce(StoreError) -> AdminError {
    move |source| AdminError::Store { operation, source }
}

/// What a delete request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// Not confirmed; nothing was written.
    Unconfirmed,
    /// Row physically removed.
    Removed,
    /// Row tombstoned with `deleted_at`.
    Archived,
    /// No live row matched; nothing was written.
    Missing,
}

/// A collection page: the ordered items plus per-bucket counts.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionPage<R> {
    /// Items in listing order.
    pub items: Vec<R>,
    /// Count per [`Record::stat_key`] bucket.
    pub stats: BTreeMap<String, usize>,
}

/// One entry submitted through a batch editor.
///
/// Items created in the browser carry temporary ids such as `new-3`; any id
/// that is not a UUID is treated as a new item.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(bound = "D: Draft")]
pub struct BatchItem<D> {
    /// Existing row id or a temporary placeholder.
    #[serde(default)]
    pub id: Option<String>,
    /// Field values.
    #[serde(flatten)]
    pub draft: D,
}

impl<D> BatchItem<D> {
    fn existing_id(&self) -> Option<Uuid> {
        self.id.as_deref().and_then(|id| Uuid::parse_str(id).ok())
    }
}

/// An item the batch editor could not save.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItemFailure {
    /// Position in the submitted list.
    pub index: usize,
    /// Submitted id, if any.
    pub id: Option<String>,
    /// Failure message.
    pub reason: String,
    /// Field-level issues for validation failures.
    pub issues: Vec<FieldIssue>,
}

/// Outcome of [`CollectionAdmin::save_all`].
#[derive(Debug, Clone, Serialize)]
pub struct BatchSaveReport<R> {
    /// Saved records, in submission order.
    pub saved: Vec<R>,
    /// Items that were not saved.
    pub failed: Vec<BatchItemFailure>,
}

/// Admin operations over one content collection.
pub struct CollectionAdmin<R> {
    store: SharedContentStore,
    events: EventBus,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for CollectionAdmin<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            events: self.events.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> CollectionAdmin<R> {
    /// Build an admin over `store`, announcing writes on `events`.
    #[must_use]
    pub const fn new(store: SharedContentStore, events: EventBus) -> Self {
        Self {
            store,
            events,
            _record: PhantomData,
        }
    }

    fn live(&self) -> Query {
        let query = Query::from(R::TABLE);
        if R::SOFT_DELETE {
            query.is_null("deleted_at")
        } else {
            query
        }
    }

    fn listed(&self) -> Query {
        match R::ORDERING {
            ListOrder::Indexed => self
                .live()
                .order("order_index", Direction::Asc)
                .order("created_at", Direction::Asc),
            ListOrder::NewestFirst => self.live().order("created_at", Direction::Desc),
        }
    }

    fn publish(&self, id: Option<Uuid>, action: ContentAction) {
        self.events.publish(Event::ContentChanged {
            table: R::TABLE.as_str().to_string(),
            id,
            action,
        });
    }

    fn decode(row: Row) -> Result<R, AdminError> {
        from_row(R::TABLE, row).map_err(store_error("decode"))
    }

    /// Every live item in listing order.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] when the fetch or decode fails.
    pub async fn load(&self) -> Result<Vec<R>, AdminError> {
        let rows = self
            .store
            .select(&self.listed())
            .await
            .map_err(store_error("collection.load"))?;
        rows.into_iter().map(Self::decode).collect()
    }

    /// Items plus per-bucket statistics.
    ///
    /// # Errors
    ///
    /// Same as [`CollectionAdmin::load`].
    pub async fn page(&self) -> Result<CollectionPage<R>, AdminError> {
        let items = self.load().await?;
        let mut stats = BTreeMap::new();
        for key in items.iter().filter_map(Record::stat_key) {
            *stats.entry(key).or_insert(0) += 1;
        }
        Ok(CollectionPage { items, stats })
    }

    /// One live item by id.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] when the fetch or decode fails.
    pub async fn get(&self, id: Uuid) -> Result<Option<R>, AdminError> {
        self.store
            .select_one(&self.live().id(id))
            .await
            .map_err(store_error("collection.get"))?
            .map(Self::decode)
            .transpose()
    }

    /// Validate `draft`, then insert it at the end of the list or update the
    /// item being edited.
    ///
    /// New items get `order_index` equal to the current item count; edits
    /// leave it unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Invalid`] without writing when validation fails,
    /// [`AdminError::NotFound`] when `editing` names no live item, and
    /// [`AdminError::Store`] when the write fails.
    pub async fn submit(&self, draft: R::Draft, editing: Option<Uuid>) -> Result<R, AdminError> {
        draft.validate()?;
        let mut row = to_row(R::TABLE, &draft).map_err(store_error("draft.encode"))?;

        if let Some(id) = editing {
            let updated = self
                .store
                .update(&self.live().id(id), row)
                .await
                .map_err(store_error("collection.update"))?;
            let row = updated.into_iter().next().ok_or(AdminError::NotFound {
                table: R::TABLE,
                id,
            })?;
            self.publish(Some(id), ContentAction::Updated);
            info!(kind = R::LABEL, %id, "record updated");
            return Self::decode(row);
        }

        if R::ORDERING == ListOrder::Indexed {
            let position = self
                .store
                .count(&self.live())
                .await
                .map_err(store_error("collection.count"))?;
            row.insert("order_index".into(), Value::from(position));
        }
        let inserted = self
            .store
            .insert(R::TABLE, row)
            .await
            .map_err(store_error("collection.insert"))?;
        let record = Self::decode(inserted)?;
        self.publish(Some(record.id()), ContentAction::Created);
        info!(kind = R::LABEL, id = %record.id(), "record created");
        Ok(record)
    }

    /// Remove an item once the user has confirmed.
    ///
    /// Soft-deleted collections stamp `deleted_at` on a live row only, so a
    /// repeated delete of the same id reports [`DeleteOutcome::Missing`].
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] when the write fails.
    pub async fn delete(&self, id: Uuid, confirmed: bool) -> Result<DeleteOutcome, AdminError> {
        if !confirmed {
            debug!(kind = R::LABEL, %id, "delete not confirmed");
            return Ok(DeleteOutcome::Unconfirmed);
        }

        let outcome = if R::SOFT_DELETE {
            let mut patch = Row::new();
            patch.insert("deleted_at".into(), Value::String(Utc::now().to_rfc3339()));
            let archived = self
                .store
                .update(&self.live().id(id), patch)
                .await
                .map_err(store_error("collection.archive"))?;
            if archived.is_empty() {
                DeleteOutcome::Missing
            } else {
                DeleteOutcome::Archived
            }
        } else {
            let removed = self
                .store
                .delete(&self.live().id(id))
                .await
                .map_err(store_error("collection.delete"))?;
            if removed == 0 {
                DeleteOutcome::Missing
            } else {
                DeleteOutcome::Removed
            }
        };

        match outcome {
            DeleteOutcome::Archived => self.publish(Some(id), ContentAction::Archived),
            DeleteOutcome::Removed => self.publish(Some(id), ContentAction::Deleted),
            DeleteOutcome::Missing | DeleteOutcome::Unconfirmed => {}
        }
        info!(kind = R::LABEL, %id, outcome = ?outcome, "delete handled");
        Ok(outcome)
    }

    /// Flip `is_visible`, writing only that column.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Unsupported`] for collections without a
    /// visibility flag, [`AdminError::NotFound`] for unknown ids, and
    /// [`AdminError::Store`] when the write fails.
    pub async fn toggle_visibility(&self, id: Uuid) -> Result<R, AdminError> {
        if !R::HAS_VISIBILITY {
            return Err(AdminError::Unsupported {
                table: R::TABLE,
                operation: "toggle_visibility",
            });
        }
        let current = self
            .store
            .select_one(&self.live().id(id))
            .await
            .map_err(store_error("collection.get"))?
            .ok_or(AdminError::NotFound {
                table: R::TABLE,
                id,
            })?;
        let visible = current
            .get("is_visible")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let mut patch = Row::new();
        patch.insert("is_visible".into(), Value::Bool(!visible));
        let updated = self
            .store
            .update(&self.live().id(id), patch)
            .await
            .map_err(store_error("collection.toggle"))?;
        let row = updated.into_iter().next().ok_or(AdminError::NotFound {
            table: R::TABLE,
            id,
        })?;
        self.publish(Some(id), ContentAction::Updated);
        Self::decode(row)
    }

    /// Set `order_index` to each id's position in `ids`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Unsupported`] for collections listed by creation
    /// time and [`AdminError::Store`] on the first failing write.
    pub async fn reorder(&self, ids: &[Uuid]) -> Result<Vec<R>, AdminError> {
        if R::ORDERING != ListOrder::Indexed {
            return Err(AdminError::Unsupported {
                table: R::TABLE,
                operation: "reorder",
            });
        }
        for (position, id) in ids.iter().enumerate() {
            let mut patch = Row::new();
            patch.insert("order_index".into(), Value::from(position));
            self.store
                .update(&self.live().id(*id), patch)
                .await
                .map_err(store_error("collection.reorder"))?;
        }
        self.publish(None, ContentAction::Reordered);
        self.load().await
    }

    /// Save a whole list from a batch editor, one item at a time.
    ///
    /// Positions in `items` become `order_index`. Items that fail validation
    /// or whose write fails are reported and skipped; the rest are saved.
    pub async fn save_all(&self, items: Vec<BatchItem<R::Draft>>) -> BatchSaveReport<R> {
        let mut report = BatchSaveReport {
            saved: Vec::with_capacity(items.len()),
            failed: Vec::new(),
        };

        for (index, item) in items.into_iter().enumerate() {
            match self.save_item(index, &item).await {
                Ok(record) => report.saved.push(record),
                Err(err) => {
                    let issues = match &err {
                        AdminError::Invalid(errors) => errors.issues.clone(),
                        _ => Vec::new(),
                    };
                    report.failed.push(BatchItemFailure {
                        index,
                        id: item.id.clone(),
                        reason: err.to_string(),
                        issues,
                    });
                }
            }
        }

        if !report.saved.is_empty() {
            self.publish(None, ContentAction::Updated);
        }
        info!(
            kind = R::LABEL,
            saved = report.saved.len(),
            failed = report.failed.len(),
            "batch save finished"
        );
        report
    }

    async fn save_item(&self, index: usize, item: &BatchItem<R::Draft>) -> Result<R, AdminError> {
        item.draft.validate()?;
        let mut row = to_row(R::TABLE, &item.draft).map_err(store_error("draft.encode"))?;
        if R::ORDERING == ListOrder::Indexed {
            row.insert("order_index".into(), Value::from(index));
        }

        let row = match item.existing_id() {
            Some(id) => self
                .store
                .update(&self.live().id(id), row)
                .await
                .map_err(store_error("collection.update"))?
                .into_iter()
                .next()
                .ok_or(AdminError::NotFound {
                    table: R::TABLE,
                    id,
                })?,
            None => self
                .store
                .insert(R::TABLE, row)
                .await
                .map_err(store_error("collection.insert"))?,
        };
        Self::decode(row)
    }
}

#[cfg(test)]
mod tests;
