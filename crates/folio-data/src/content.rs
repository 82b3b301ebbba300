//! PostgreSQL implementation of the content store.
//!
//! # Design
//! - Statements come from `sql.rs`; this module only binds, executes and
//!   maps errors.
//! - `upsert_batch` runs in one transaction: either every row lands or none
//!   does, and the outcome names the row that stopped it.
//! - Unique violations become [`StoreError::Conflict`]; value and constraint
//!   violations become [`StoreError::InvalidRow`]; everything else is a
//!   [`StoreError::Backend`] carrying the operation name.

use async_trait::async_trait;
use folio_core::store::{
    BatchFailure, BatchOutcome, ContentStore, Query, Row, StoreError, StoreResult, Table,
    conflict_key, prepare_insert, prepare_patch, validate_columns,
};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{Postgres, Row as _};
use tracing::{debug, warn};

use crate::error::{DataError, Result};
use crate::sql::{self, Statement};

/// Pool size used by [`PgContentStore::connect`].
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Content store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    /// Connect to `database_url` and apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or migrations fail.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|source| DataError::ConnectFailed { source })?;
        Self::new(pool).await
    }

    /// Wrap an existing pool, applying pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if migrations fail.
    pub async fn new(pool: PgPool) -> Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|source| DataError::MigrationFailed { source })?;
        Ok(Self { pool })
    }

    /// Access the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn bind(
    statement: &Statement,
) -> sqlx::query::Query<'_, Postgres, sqlx::postgres::PgArguments> {
    statement
        .params
        .iter()
        .fold(sqlx::query(&statement.sql), |query, param| {
            query.bind(Json(param.clone()))
        })
}

fn decode(table: Table, row: &PgRow) -> StoreResult<Row> {
    let Json(value) = row
        .try_get::<Json<Value>, _>("row")
        .map_err(|err| backend("decode_row", table, err))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::InvalidRow {
            table,
            reason: "row_not_an_object",
        }),
    }
}

fn backend(operation: &'static str, table: Table, err: sqlx::Error) -> StoreError {
    StoreError::Backend {
        operation,
        table,
        source: Box::new(err),
    }
}

fn unique_column(table: Table, constraint: Option<&str>) -> &'static str {
    let Some(constraint) = constraint else {
        return "id";
    };
    if constraint.ends_with("_pkey") {
        return "id";
    }
    table
        .unique_columns()
        .iter()
        .copied()
        .find(|column| constraint.contains(&format!("_{column}_")))
        .unwrap_or("id")
}

fn map_sqlx(operation: &'static str, table: Table, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        let code = db.code();
        match code.as_deref() {
            Some("23505") => {
                return StoreError::Conflict {
                    table,
                    column: unique_column(table, db.constraint()),
                };
            }
            Some("23502") => {
                return StoreError::InvalidRow {
                    table,
                    reason: "missing_required_column",
                };
            }
            Some("23514") => {
                return StoreError::InvalidRow {
                    table,
                    reason: "check_violation",
                };
            }
            Some(code) if code.starts_with("22") => {
                return StoreError::InvalidRow {
                    table,
                    reason: "invalid_value",
                };
            }
            _ => {}
        }
    }
    backend(operation, table, err)
}

fn prepare_upsert(table: Table, row: Row, conflict: &'static str) -> StoreResult<Statement> {
    let conflict = table.column(conflict)?;
    validate_columns(table, &row)?;
    if row.get(conflict).is_none_or(Value::is_null) {
        return Err(StoreError::InvalidRow {
            table,
            reason: "missing_conflict_key",
        });
    }
    sql::upsert(table, prepare_insert(table, row)?, conflict)
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn select(&self, query: &Query) -> StoreResult<Vec<Row>> {
        let table = query.table();
        let statement = sql::select(query)?;
        let rows = bind(&statement)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| map_sqlx("select", table, err))?;
        rows.iter().map(|row| decode(table, row)).collect()
    }

    async fn count(&self, query: &Query) -> StoreResult<u64> {
        let table = query.table();
        let statement = sql::count(query)?;
        let row = bind(&statement)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_sqlx("count", table, err))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|err| backend("count", table, err))?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row> {
        let statement = sql::insert(table, prepare_insert(table, row)?)?;
        let row = bind(&statement)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_sqlx("insert", table, err))?;
        decode(table, &row)
    }

    async fn update(&self, query: &Query, patch: Row) -> StoreResult<Vec<Row>> {
        let table = query.table();
        let patch = prepare_patch(table, patch)?;
        let Some(statement) = sql::update(query, patch)? else {
            return self.select(query).await;
        };
        let rows = bind(&statement)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| map_sqlx("update", table, err))?;
        rows.iter().map(|row| decode(table, row)).collect()
    }

    async fn delete(&self, query: &Query) -> StoreResult<u64> {
        let table = query.table();
        let statement = sql::delete(query)?;
        let result = bind(&statement)
            .execute(&self.pool)
            .await
            .map_err(|err| map_sqlx("delete", table, err))?;
        Ok(result.rows_affected())
    }

    async fn upsert(&self, table: Table, row: Row, conflict: &'static str) -> StoreResult<Row> {
        let statement = prepare_upsert(table, row, conflict)?;
        let row = bind(&statement)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_sqlx("upsert", table, err))?;
        decode(table, &row)
    }

    async fn upsert_batch(
        &self,
        table: Table,
        rows: Vec<Row>,
        conflict: &'static str,
    ) -> BatchOutcome {
        let keys: Vec<String> = rows.iter().map(|row| conflict_key(row, conflict)).collect();
        let rolled_back = |failed_index: Option<usize>, message: String| {
            let failed_key = failed_index.map_or_else(String::new, |index| keys[index].clone());
            BatchOutcome {
                applied: Vec::new(),
                failed: Some(BatchFailure {
                    key: failed_key,
                    message,
                }),
                not_applied: keys
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| Some(*index) != failed_index)
                    .map(|(_, key)| key.clone())
                    .collect(),
            }
        };

        let mut tx = match self.pool.begin().await {
            Ok(tx) => tx,
            Err(err) => {
                warn!(table = %table, error = %err, "batch upsert could not open a transaction");
                return rolled_back(None, map_sqlx("begin", table, err).to_string());
            }
        };

        for (index, row) in rows.into_iter().enumerate() {
            let written = match prepare_upsert(table, row, conflict) {
                Ok(statement) => bind(&statement)
                    .execute(&mut *tx)
                    .await
                    .map(|_| ())
                    .map_err(|err| map_sqlx("upsert_batch", table, err)),
                Err(err) => Err(err),
            };
            if let Err(err) = written {
                warn!(table = %table, key = %keys[index], error = %err, "batch upsert rolled back");
                if let Err(rollback) = tx.rollback().await {
                    warn!(table = %table, error = %rollback, "rollback failed");
                }
                return rolled_back(Some(index), err.to_string());
            }
        }

        if let Err(err) = tx.commit().await {
            warn!(table = %table, error = %err, "batch upsert commit failed");
            return rolled_back(None, map_sqlx("commit", table, err).to_string());
        }
        debug!(table = %table, rows = keys.len(), "batch upsert committed");
        BatchOutcome {
            applied: keys.clone(),
            failed: None,
            not_applied: Vec::new(),
        }
    }
}
