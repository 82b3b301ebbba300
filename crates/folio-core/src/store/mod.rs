//! Content store contract shared by the public renderer and the admin editor.
//!
//! # Design
//!
//! - Rows travel as JSON objects so one contract covers all nine tables.
//! - Column names are checked against a static per-table schema before any
//!   backend sees them; backends never interpolate caller-supplied names.
//! - Batch upserts default to a sequential loop that stops at the first
//!   failure and reports exactly which keys landed. Transactional backends
//!   override it with an all-or-nothing write.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

mod memory;

pub use memory::MemoryStore;

/// A stored row as a JSON object keyed by column name.
pub type Row = Map<String, Value>;

/// Shared handle to a content store implementation.
pub type SharedContentStore = Arc<dyn ContentStore>;

/// Result alias for content store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by content store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A column name is not part of the table schema.
    #[error("unknown column")]
    UnknownColumn {
        /// Table addressed.
        table: Table,
        /// Offending column name.
        column: String,
    },
    /// A value is not a JSON object or cannot be stored in its column.
    #[error("invalid row")]
    InvalidRow {
        /// Table addressed.
        table: Table,
        /// Machine-readable reason.
        reason: &'static str,
    },
    /// A unique constraint rejected the write.
    #[error("unique constraint violated")]
    Conflict {
        /// Table addressed.
        table: Table,
        /// Column carrying the unique constraint.
        column: &'static str,
    },
    /// A stored row could not be decoded into its record type.
    #[error("failed to decode stored row")]
    Decode {
        /// Table addressed.
        table: Table,
        /// Underlying serde failure.
        #[source]
        source: serde_json::Error,
    },
    /// The backing store failed.
    #[error("content store operation failed")]
    Backend {
        /// Operation identifier.
        operation: &'static str,
        /// Table addressed.
        table: Table,
        /// Underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Tables owned by the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// Key/value configuration.
    SiteSettings,
    /// Public section visibility.
    SectionConfig,
    /// Goals.
    Goals,
    /// Skills.
    Skills,
    /// Tools.
    Tools,
    /// Hero badges.
    HeroBadges,
    /// Social links.
    SocialLinks,
    /// Navbar links.
    NavigationLinks,
    /// Projects (soft-deleted).
    Projects,
}

impl Table {
    /// Every table, in migration order.
    pub const ALL: [Self; 9] = [
        Self::SiteSettings,
        Self::SectionConfig,
        Self::Goals,
        Self::Skills,
        Self::Tools,
        Self::HeroBadges,
        Self::SocialLinks,
        Self::NavigationLinks,
        Self::Projects,
    ];

    /// SQL table name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SiteSettings => "site_settings",
            Self::SectionConfig => "section_config",
            Self::Goals => "goals",
            Self::Skills => "skills",
            Self::Tools => "tools",
            Self::HeroBadges => "hero_badges",
            Self::SocialLinks => "social_links",
            Self::NavigationLinks => "navigation_links",
            Self::Projects => "projects",
        }
    }

    /// Column schema, in declaration order.
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::SiteSettings => &[
                "id",
                "key",
                "value",
                "category",
                "type",
                "description",
                "created_at",
                "updated_at",
            ],
            Self::SectionConfig => &[
                "id",
                "section_name",
                "is_visible",
                "display_title",
                "description",
                "order_index",
                "settings",
                "created_at",
                "updated_at",
            ],
            Self::Goals => &[
                "id",
                "title",
                "description",
                "category",
                "status",
                "priority",
                "target_date",
                "scope",
                "year",
                "month",
                "is_visible",
                "order_index",
                "created_at",
            ],
            Self::Skills => &[
                "id",
                "name",
                "category",
                "proficiency",
                "level",
                "icon",
                "order_index",
                "created_at",
            ],
            Self::Tools => &[
                "id",
                "name",
                "category",
                "description",
                "icon",
                "website_url",
                "is_visible",
                "order_index",
                "created_at",
            ],
            Self::HeroBadges => &[
                "id",
                "text",
                "icon",
                "link",
                "is_visible",
                "order_index",
                "created_at",
            ],
            Self::SocialLinks => &[
                "id",
                "platform",
                "url",
                "icon",
                "label",
                "is_visible",
                "order_index",
                "created_at",
            ],
            Self::NavigationLinks => &[
                "id",
                "label",
                "href",
                "order_index",
                "is_visible",
                "is_external",
                "created_at",
            ],
            Self::Projects => &[
                "id",
                "name",
                "type",
                "status",
                "stack",
                "github_url",
                "app_url",
                "description",
                "created_at",
                "deleted_at",
            ],
        }
    }

    /// Columns carrying a unique constraint besides `id`.
    #[must_use]
    pub const fn unique_columns(self) -> &'static [&'static str] {
        match self {
            Self::SiteSettings => &["key"],
            Self::SectionConfig => &["section_name"],
            _ => &[],
        }
    }

    /// Resolve a column name to its static schema entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownColumn`] when the table has no such column.
    pub fn column(self, name: &str) -> StoreResult<&'static str> {
        self.columns()
            .iter()
            .copied()
            .find(|column| *column == name)
            .ok_or_else(|| StoreError::UnknownColumn {
                table: self,
                column: name.to_string(),
            })
    }

    fn has_column(self, name: &str) -> bool {
        self.columns().contains(&name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first; nulls last.
    Asc,
    /// Largest first; nulls first.
    Desc,
}

/// Row predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Column equals a JSON value.
    Eq(&'static str, Value),
    /// Column is null.
    IsNull(&'static str),
}

/// Select/update/delete target built fluently.
///
/// ```
/// use folio_core::store::{Direction, Query, Table};
///
/// let query = Query::from(Table::Projects)
///     .is_null("deleted_at")
///     .order("created_at", Direction::Desc)
///     .limit(6);
/// assert_eq!(query.table(), Table::Projects);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: Table,
    filters: Vec<Filter>,
    order: Vec<(&'static str, Direction)>,
    limit: Option<usize>,
}

impl Query {
    /// Start a query over `table` with no filters.
    #[must_use]
    pub const fn from(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Keep rows whose `column` equals `value`.
    #[must_use]
    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column, value.into()));
        self
    }

    /// Keep rows whose `column` is `id`.
    #[must_use]
    pub fn id(self, id: Uuid) -> Self {
        self.eq("id", id.to_string())
    }

    /// Keep rows whose `column` is null.
    #[must_use]
    pub fn is_null(mut self, column: &'static str) -> Self {
        self.filters.push(Filter::IsNull(column));
        self
    }

    /// Append an ordering key.
    #[must_use]
    pub fn order(mut self, column: &'static str, direction: Direction) -> Self {
        self.order.push((column, direction));
        self
    }

    /// Cap the number of returned rows.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Target table.
    #[must_use]
    pub const fn table(&self) -> Table {
        self.table
    }

    /// Row predicates, all of which must hold.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Ordering keys, most significant first.
    #[must_use]
    pub fn ordering(&self) -> &[(&'static str, Direction)] {
        &self.order
    }

    /// Row cap, if any.
    #[must_use]
    pub const fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Check every referenced column against the table schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownColumn`] for the first unknown column.
    pub fn validate(&self) -> StoreResult<()> {
        for filter in &self.filters {
            let column = match filter {
                Filter::Eq(column, _) | Filter::IsNull(column) => column,
            };
            self.table.column(column)?;
        }
        for (column, _) in &self.order {
            self.table.column(column)?;
        }
        Ok(())
    }
}

/// Result of a batch upsert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// Conflict keys that were persisted, in submission order.
    pub applied: Vec<String>,
    /// The key whose write failed, with the failure message.
    pub failed: Option<BatchFailure>,
    /// Keys that were not persisted because of the failure.
    pub not_applied: Vec<String>,
}

/// The write that stopped a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    /// Conflict key of the failing row.
    pub key: String,
    /// Failure message.
    pub message: String,
}

impl BatchOutcome {
    /// True when every row was persisted.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

/// Table-oriented content store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Rows matching `query`, ordered and limited as requested.
    async fn select(&self, query: &Query) -> StoreResult<Vec<Row>>;

    /// First row matching `query`.
    async fn select_one(&self, query: &Query) -> StoreResult<Option<Row>> {
        let rows = self.select(&query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Number of rows matching `query` (ordering and limit ignored).
    async fn count(&self, query: &Query) -> StoreResult<u64>;

    /// Insert `row`, returning the stored row with defaults filled in.
    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row>;

    /// Apply `patch` to every row matching `query`, returning the new rows.
    async fn update(&self, query: &Query, patch: Row) -> StoreResult<Vec<Row>>;

    /// Remove rows matching `query`, returning how many were removed.
    async fn delete(&self, query: &Query) -> StoreResult<u64>;

    /// Insert `row`, or update the existing row sharing `conflict`.
    async fn upsert(&self, table: Table, row: Row, conflict: &'static str) -> StoreResult<Row>;

    /// Upsert `rows` one at a time, stopping at the first failure.
    async fn upsert_batch(
        &self,
        table: Table,
        rows: Vec<Row>,
        conflict: &'static str,
    ) -> BatchOutcome {
        let keys: Vec<String> = rows.iter().map(|row| conflict_key(row, conflict)).collect();
        let mut outcome = BatchOutcome::default();
        for (index, row) in rows.into_iter().enumerate() {
            match self.upsert(table, row, conflict).await {
                Ok(_) => outcome.applied.push(keys[index].clone()),
                Err(err) => {
                    outcome.failed = Some(BatchFailure {
                        key: keys[index].clone(),
                        message: err.to_string(),
                    });
                    outcome.not_applied = keys[index + 1..].to_vec();
                    break;
                }
            }
        }
        outcome
    }
}

/// Render the conflict-key value of `row` for reporting.
#[must_use]
pub fn conflict_key(row: &Row, conflict: &str) -> String {
    match row.get(conflict) {
        Some(Value::String(value)) => value.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Check every key of `row` against the table schema.
///
/// # Errors
///
/// Returns [`StoreError::UnknownColumn`] for the first unknown key.
pub fn validate_columns(table: Table, row: &Row) -> StoreResult<()> {
    for key in row.keys() {
        table.column(key)?;
    }
    Ok(())
}

/// Fill `id` and timestamps on a row about to be inserted.
///
/// # Errors
///
/// Returns [`StoreError::UnknownColumn`] when the row names a column the table
/// does not have.
pub fn prepare_insert(table: Table, mut row: Row) -> StoreResult<Row> {
    validate_columns(table, &row)?;
    let now = Value::String(Utc::now().to_rfc3339());
    if !matches!(row.get("id"), Some(Value::String(_))) {
        row.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
    }
    for column in ["created_at", "updated_at"] {
        if table.has_column(column) && row.get(column).is_none_or(Value::is_null) {
            row.insert(column.into(), now.clone());
        }
    }
    Ok(row)
}

/// Stamp `updated_at` on a patch and reject unknown or immutable columns.
///
/// # Errors
///
/// Returns [`StoreError::UnknownColumn`] for unknown columns and
/// [`StoreError::InvalidRow`] when the patch tries to change `id`.
pub fn prepare_patch(table: Table, mut patch: Row) -> StoreResult<Row> {
    validate_columns(table, &patch)?;
    if patch.contains_key("id") {
        return Err(StoreError::InvalidRow {
            table,
            reason: "id_is_immutable",
        });
    }
    if table.has_column("updated_at") {
        patch.insert(
            "updated_at".into(),
            Value::String(Utc::now().to_rfc3339()),
        );
    }
    Ok(patch)
}

/// Serialize a record or draft into a row.
///
/// # Errors
///
/// Returns [`StoreError::InvalidRow`] when the value does not serialize to a
/// JSON object.
pub fn to_row<T: Serialize>(table: Table, value: &T) -> StoreResult<Row> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(_) => Err(StoreError::InvalidRow {
            table,
            reason: "not_an_object",
        }),
        Err(source) => Err(StoreError::Decode { table, source }),
    }
}

/// Decode a stored row into a record.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] when the row does not match the record.
pub fn from_row<T: DeserializeOwned>(table: Table, row: Row) -> StoreResult<T> {
    serde_json::from_value(Value::Object(row)).map_err(|source| StoreError::Decode { table, source })
}
