//! SQL statement construction for the generic content store.
//!
//! # Design
//! - Identifiers come only from the static table schema in `folio-core`;
//!   every caller-supplied value travels as a bound `jsonb` parameter.
//! - Values are decoded into column types by `jsonb_populate_record`, and
//!   rows come back as `to_jsonb(t)`, so one statement shape serves all
//!   nine tables.

use folio_core::store::{Direction, Filter, Query, Row, StoreResult, Table};
use serde_json::{Map, Value};

/// A statement ready to be bound: every parameter is a `jsonb` value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statement {
    pub(crate) sql: String,
    pub(crate) params: Vec<Value>,
}

fn ident(column: &str) -> String {
    format!("\"{column}\"")
}

fn record(table: Table, param: usize) -> String {
    format!("jsonb_populate_record(NULL::{}, ${param})", table.as_str())
}

fn where_clause(query: &Query, params: &mut Vec<Value>) -> String {
    let table = query.table();
    let conditions: Vec<String> = query
        .filters()
        .iter()
        .map(|filter| match filter {
            Filter::IsNull(column) | Filter::Eq(column, Value::Null) => {
                format!("t.{} IS NULL", ident(column))
            }
            Filter::Eq(column, value) => {
                let mut probe = Map::new();
                probe.insert((*column).to_string(), value.clone());
                params.push(Value::Object(probe));
                format!(
                    "t.{col} = ({}).{col}",
                    record(table, params.len()),
                    col = ident(column)
                )
            }
        })
        .collect();
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

fn order_clause(query: &Query) -> String {
    if query.ordering().is_empty() {
        return String::new();
    }
    let keys: Vec<String> = query
        .ordering()
        .iter()
        .map(|(column, direction)| {
            let direction = match direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            format!("t.{} {direction}", ident(column))
        })
        .collect();
    format!(" ORDER BY {}", keys.join(", "))
}

fn row_columns(table: Table, row: &Row) -> StoreResult<Vec<&'static str>> {
    row.keys().map(|key| table.column(key)).collect()
}

pub(crate) fn select(query: &Query) -> StoreResult<Statement> {
    query.validate()?;
    let mut params = Vec::new();
    let filters = where_clause(query, &mut params);
    let limit = query
        .row_limit()
        .map(|limit| format!(" LIMIT {limit}"))
        .unwrap_or_default();
    Ok(Statement {
        sql: format!(
            "SELECT to_jsonb(t) AS row FROM {} AS t{filters}{}{limit}",
            query.table().as_str(),
            order_clause(query)
        ),
        params,
    })
}

pub(crate) fn count(query: &Query) -> StoreResult<Statement> {
    query.validate()?;
    let mut params = Vec::new();
    let filters = where_clause(query, &mut params);
    Ok(Statement {
        sql: format!(
            "SELECT count(*) AS total FROM {} AS t{filters}",
            query.table().as_str()
        ),
        params,
    })
}

fn insert_head(table: Table, columns: &[&'static str]) -> String {
    let names: Vec<String> = columns.iter().map(|column| ident(column)).collect();
    let values: Vec<String> = columns
        .iter()
        .map(|column| format!("r.{}", ident(column)))
        .collect();
    format!(
        "INSERT INTO {name} AS t ({}) SELECT {} FROM {} AS r",
        names.join(", "),
        values.join(", "),
        record(table, 1),
        name = table.as_str()
    )
}

/// `row` must already carry its id and timestamps.
pub(crate) fn insert(table: Table, row: Row) -> StoreResult<Statement> {
    let columns = row_columns(table, &row)?;
    Ok(Statement {
        sql: format!("{} RETURNING to_jsonb(t) AS row", insert_head(table, &columns)),
        params: vec![Value::Object(row)],
    })
}

/// `None` when the patch is empty and there is nothing to write.
pub(crate) fn update(query: &Query, patch: Row) -> StoreResult<Option<Statement>> {
    query.validate()?;
    let table = query.table();
    let columns = row_columns(table, &patch)?;
    if columns.is_empty() {
        return Ok(None);
    }
    let mut params = vec![Value::Object(patch)];
    let filters = where_clause(query, &mut params);
    let assignments: Vec<String> = columns
        .iter()
        .map(|column| format!("{col} = p.{col}", col = ident(column)))
        .collect();
    Ok(Some(Statement {
        sql: format!(
            "UPDATE {} AS t SET {} FROM {} AS p{filters} RETURNING to_jsonb(t) AS row",
            table.as_str(),
            assignments.join(", "),
            record(table, 1)
        ),
        params,
    }))
}

pub(crate) fn delete(query: &Query) -> StoreResult<Statement> {
    query.validate()?;
    let mut params = Vec::new();
    let filters = where_clause(query, &mut params);
    Ok(Statement {
        sql: format!("DELETE FROM {} AS t{filters}", query.table().as_str()),
        params,
    })
}

/// `row` must already carry its id and timestamps.
pub(crate) fn upsert(table: Table, row: Row, conflict: &'static str) -> StoreResult<Statement> {
    let columns = row_columns(table, &row)?;
    let mut assignments: Vec<String> = columns
        .iter()
        .filter(|column| !matches!(**column, "id" | "created_at") && **column != conflict)
        .map(|column| format!("{col} = EXCLUDED.{col}", col = ident(column)))
        .collect();
    if assignments.is_empty() {
        assignments.push(format!("{col} = EXCLUDED.{col}", col = ident(conflict)));
    }
    Ok(Statement {
        sql: format!(
            "{} ON CONFLICT ({}) DO UPDATE SET {} RETURNING to_jsonb(t) AS row",
            insert_head(table, &columns),
            ident(conflict),
            assignments.join(", ")
        ),
        params: vec![Value::Object(row)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::store::StoreError;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => Row::new(),
        }
    }

    #[test]
    fn select_binds_every_value() {
        let query = Query::from(Table::Projects)
            .eq("status", "mvp")
            .is_null("deleted_at")
            .order("created_at", Direction::Desc)
            .limit(6);
        let statement = select(&query).expect("statement");
        assert_eq!(
            statement.sql,
            "SELECT to_jsonb(t) AS row FROM projects AS t WHERE t.\"status\" = \
             (jsonb_populate_record(NULL::projects, $1)).\"status\" AND t.\"deleted_at\" IS NULL \
             ORDER BY t.\"created_at\" DESC LIMIT 6"
        );
        assert_eq!(statement.params, vec![json!({"status": "mvp"})]);
    }

    #[test]
    fn null_equality_becomes_is_null() {
        let statement = count(&Query::from(Table::Goals).eq("year", Value::Null)).expect("count");
        assert_eq!(
            statement.sql,
            "SELECT count(*) AS total FROM goals AS t WHERE t.\"year\" IS NULL"
        );
        assert!(statement.params.is_empty());
    }

    #[test]
    fn update_numbers_filter_params_after_the_patch() {
        let query = Query::from(Table::Tools).eq("id", "abc");
        let statement = update(&query, row(json!({"is_visible": false})))
            .expect("statement")
            .expect("non-empty patch");
        assert!(statement.sql.starts_with(
            "UPDATE tools AS t SET \"is_visible\" = p.\"is_visible\" FROM \
             jsonb_populate_record(NULL::tools, $1) AS p WHERE t.\"id\" = \
             (jsonb_populate_record(NULL::tools, $2)).\"id\""
        ));
        assert_eq!(statement.params.len(), 2);

        assert!(update(&query, Row::new()).expect("empty").is_none());
    }

    #[test]
    fn upsert_never_rewrites_identity_or_conflict_key() {
        let statement = upsert(
            Table::SiteSettings,
            row(json!({"id": "x", "key": "hero_title", "value": "Hi", "created_at": "now"})),
            "key",
        )
        .expect("statement");
        assert!(statement.sql.contains("ON CONFLICT (\"key\") DO UPDATE SET \"value\" = EXCLUDED.\"value\""));
        assert!(!statement.sql.contains("\"id\" = EXCLUDED"));
        assert!(!statement.sql.contains("\"created_at\" = EXCLUDED"));
        assert!(!statement.sql.contains("\"key\" = EXCLUDED"));
    }

    #[test]
    fn unknown_columns_never_reach_sql() {
        let err = insert(Table::Skills, row(json!({"name; drop table skills": 1})))
            .expect_err("rejected");
        assert!(matches!(err, StoreError::UnknownColumn { table: Table::Skills, .. }));

        let err = delete(&Query::from(Table::Skills).eq("nope", 1)).expect_err("rejected");
        assert!(matches!(err, StoreError::UnknownColumn { .. }));
    }
}
