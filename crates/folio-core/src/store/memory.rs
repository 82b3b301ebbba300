//! In-memory content store used by the demo build and by tests.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use super::{
    ContentStore, Direction, Filter, Query, Row, StoreError, StoreResult, Table, prepare_insert,
    prepare_patch, validate_columns,
};

/// Content store holding every table in process memory.
///
/// Ordering follows PostgreSQL defaults (nulls sort last ascending, first
/// descending) so both stores render identically given the same rows.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `rows`, bypassing id/timestamp assignment.
    #[must_use]
    pub fn with_rows(rows: impl IntoIterator<Item = (Table, Row)>) -> Self {
        let store = Self::new();
        {
            let mut tables = store.write();
            for (table, row) in rows {
                tables.entry(table).or_default().push(row);
            }
        }
        store
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Table, Vec<Row>>> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Table, Vec<Row>>> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn matches(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| match filter {
        Filter::Eq(column, Value::Null) | Filter::IsNull(column) => {
            row.get(*column).is_none_or(Value::is_null)
        }
        Filter::Eq(column, expected) => row
            .get(*column)
            .is_some_and(|actual| values_equal(actual, expected)),
    })
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn parse_instant(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let left = left.filter(|value| !value.is_null());
    let right = right.filter(|value| !value.is_null());
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (parse_instant(a), parse_instant(b)) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

fn sort_rows(rows: &mut [Row], keys: &[(&'static str, Direction)]) {
    rows.sort_by(|left, right| {
        for (column, direction) in keys {
            let ordering = compare_values(left.get(*column), right.get(*column));
            let ordering = match direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn check_unique(table: Table, rows: &[Row], candidate: &Row, skip: Option<usize>) -> StoreResult<()> {
    let columns = std::iter::once("id").chain(table.unique_columns().iter().copied());
    for column in columns {
        let Some(value) = candidate.get(column).filter(|value| !value.is_null()) else {
            continue;
        };
        let clash = rows
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != skip)
            .any(|(_, row)| row.get(column) == Some(value));
        if clash {
            return Err(StoreError::Conflict { table, column });
        }
    }
    Ok(())
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn select(&self, query: &Query) -> StoreResult<Vec<Row>> {
        query.validate()?;
        let tables = self.read();
        let mut rows: Vec<Row> = tables
            .get(&query.table())
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches(row, query.filters()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sort_rows(&mut rows, query.ordering());
        if let Some(limit) = query.row_limit() {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn count(&self, query: &Query) -> StoreResult<u64> {
        query.validate()?;
        let tables = self.read();
        let count = tables.get(&query.table()).map_or(0, |rows| {
            rows.iter().filter(|row| matches(row, query.filters())).count()
        });
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row> {
        let row = prepare_insert(table, row)?;
        let mut tables = self.write();
        let rows = tables.entry(table).or_default();
        check_unique(table, rows, &row, None)?;
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, query: &Query, patch: Row) -> StoreResult<Vec<Row>> {
        query.validate()?;
        let table = query.table();
        let patch = prepare_patch(table, patch)?;
        let mut tables = self.write();
        let rows = tables.entry(table).or_default();

        let targets: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matches(row, query.filters()))
            .map(|(index, _)| index)
            .collect();

        for index in &targets {
            let mut candidate = rows[*index].clone();
            candidate.extend(patch.clone());
            check_unique(table, rows, &candidate, Some(*index))?;
        }

        let mut updated = Vec::with_capacity(targets.len());
        for index in targets {
            rows[index].extend(patch.clone());
            updated.push(rows[index].clone());
        }
        Ok(updated)
    }

    async fn delete(&self, query: &Query) -> StoreResult<u64> {
        query.validate()?;
        let mut tables = self.write();
        let rows = tables.entry(query.table()).or_default();
        let before = rows.len();
        rows.retain(|row| !matches(row, query.filters()));
        Ok(u64::try_from(before - rows.len()).unwrap_or(u64::MAX))
    }

    async fn upsert(&self, table: Table, row: Row, conflict: &'static str) -> StoreResult<Row> {
        let conflict = table.column(conflict)?;
        validate_columns(table, &row)?;
        let Some(key) = row.get(conflict).cloned() else {
            return Err(StoreError::InvalidRow {
                table,
                reason: "missing_conflict_key",
            });
        };

        let mut tables = self.write();
        let rows = tables.entry(table).or_default();
        match rows
            .iter()
            .position(|candidate| candidate.get(conflict) == Some(&key))
        {
            None => {
                let row = prepare_insert(table, row)?;
                check_unique(table, rows, &row, None)?;
                rows.push(row.clone());
                Ok(row)
            }
            Some(index) => {
                let mut patch = row;
                patch.remove("id");
                patch.remove("created_at");
                let mut candidate = rows[index].clone();
                candidate.extend(prepare_patch(table, patch)?);
                check_unique(table, rows, &candidate, Some(index))?;
                rows[index] = candidate.clone();
                Ok(candidate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => Row::new(),
        }
    }

    #[tokio::test]
    async fn ordering_follows_postgres_null_placement() {
        let store = MemoryStore::new();
        for year in [json!(2024), json!(null), json!(2025)] {
            store
                .insert(Table::Goals, row(json!({"title": "g", "year": year})))
                .await
                .expect("insert");
        }

        let desc = store
            .select(&Query::from(Table::Goals).order("year", Direction::Desc))
            .await
            .expect("select");
        let years: Vec<Value> = desc.iter().map(|row| row["year"].clone()).collect();
        assert_eq!(years, vec![json!(null), json!(2025), json!(2024)]);

        let asc = store
            .select(&Query::from(Table::Goals).order("year", Direction::Asc))
            .await
            .expect("select");
        assert_eq!(asc.last().map(|row| row["year"].clone()), Some(json!(null)));
    }

    #[tokio::test]
    async fn timestamps_order_chronologically_across_offsets() {
        let store = MemoryStore::with_rows([
            (
                Table::Skills,
                row(json!({"name": "late", "created_at": "2025-01-01T10:00:00+02:00"})),
            ),
            (
                Table::Skills,
                row(json!({"name": "early", "created_at": "2025-01-01T09:00:00+00:00"})),
            ),
        ]);
        let rows = store
            .select(&Query::from(Table::Skills).order("created_at", Direction::Asc))
            .await
            .expect("select");
        assert_eq!(rows[0]["name"], "late");
    }

    #[tokio::test]
    async fn update_touches_only_patched_columns() {
        let store = MemoryStore::new();
        let inserted = store
            .insert(
                Table::Tools,
                row(json!({"name": "Docker", "category": "backend", "is_visible": true})),
            )
            .await
            .expect("insert");
        let id = inserted["id"].as_str().expect("id").to_string();

        let updated = store
            .update(
                &Query::from(Table::Tools).eq("id", id.clone()),
                row(json!({"is_visible": false})),
            )
            .await
            .expect("update");
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["is_visible"], false);
        assert_eq!(updated[0]["name"], "Docker");
        assert_eq!(updated[0]["category"], "backend");
    }

    #[tokio::test]
    async fn upsert_updates_on_conflict_key() {
        let store = MemoryStore::new();
        let first = store
            .upsert(
                Table::SiteSettings,
                row(json!({"key": "site_title", "value": "A", "category": "metadata", "type": "text"})),
                "key",
            )
            .await
            .expect("insert");
        let second = store
            .upsert(
                Table::SiteSettings,
                row(json!({"key": "site_title", "value": "B", "category": "metadata", "type": "text"})),
                "key",
            )
            .await
            .expect("update");
        assert_eq!(first["id"], second["id"]);
        assert_eq!(second["value"], "B");
        assert_eq!(
            store
                .count(&Query::from(Table::SiteSettings))
                .await
                .expect("count"),
            1
        );
    }

    #[tokio::test]
    async fn insert_enforces_unique_columns() {
        let store = MemoryStore::new();
        let section = json!({"section_name": "goals", "is_visible": true, "display_title": "Goals", "order_index": 1});
        store
            .insert(Table::SectionConfig, row(section.clone()))
            .await
            .expect("first insert");
        let err = store
            .insert(Table::SectionConfig, row(section))
            .await
            .expect_err("duplicate rejected");
        assert!(matches!(
            err,
            StoreError::Conflict {
                column: "section_name",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn delete_and_count_respect_filters() {
        let store = MemoryStore::new();
        for name in ["a", "b", "c"] {
            store
                .insert(Table::HeroBadges, row(json!({"text": name, "is_visible": name != "b"})))
                .await
                .expect("insert");
        }
        let visible = Query::from(Table::HeroBadges).eq("is_visible", true);
        assert_eq!(store.count(&visible).await.expect("count"), 2);
        assert_eq!(store.delete(&visible).await.expect("delete"), 2);
        assert_eq!(
            store
                .count(&Query::from(Table::HeroBadges))
                .await
                .expect("count"),
            1
        );
    }

    #[tokio::test]
    async fn unknown_columns_never_reach_rows() {
        let store = MemoryStore::new();
        let err = store
            .insert(Table::Skills, row(json!({"name": "Go", "rating": 5})))
            .await
            .expect_err("unknown column");
        assert!(matches!(err, StoreError::UnknownColumn { .. }));
        assert_eq!(
            store.count(&Query::from(Table::Skills)).await.expect("count"),
            0
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_upserts_of_a_new_key_all_succeed() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let tasks: Vec<_> = (0..16)
            .map(|n| {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .upsert(
                            Table::SiteSettings,
                            row(json!({"key": "site_title", "value": format!("v{n}"), "category": "metadata", "type": "text"})),
                            "key",
                        )
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.expect("join").expect("upsert");
        }
        assert_eq!(
            store
                .count(&Query::from(Table::SiteSettings))
                .await
                .expect("count"),
            1
        );
    }

    #[tokio::test]
    async fn eq_null_matches_missing_and_null_columns() {
        let store = MemoryStore::with_rows([
            (Table::Goals, row(json!({"title": "missing"}))),
            (Table::Goals, row(json!({"title": "null", "year": null}))),
            (Table::Goals, row(json!({"title": "set", "year": 2025}))),
        ]);
        let by_eq = store
            .count(&Query::from(Table::Goals).eq("year", Value::Null))
            .await
            .expect("count");
        let by_is_null = store
            .count(&Query::from(Table::Goals).is_null("year"))
            .await
            .expect("count");
        assert_eq!(by_eq, 2);
        assert_eq!(by_eq, by_is_null);
    }
}
