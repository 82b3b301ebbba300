//! Generic handlers shared by every ordered collection page.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use folio_core::admin::{BatchItem, BatchSaveReport, CollectionPage, DeleteOutcome};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::parse_id;
use crate::http::errors::ApiError;
use crate::state::{AdminCollection, ApiState};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeleteQuery {
    #[serde(default)]
    pub(crate) confirm: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteResponse {
    pub(crate) id: Uuid,
    pub(crate) outcome: DeleteOutcome,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReorderRequest {
    pub(crate) ids: Vec<Uuid>,
}

pub(crate) async fn page<R: AdminCollection>(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<CollectionPage<R>>, ApiError> {
    Ok(Json(R::admin(&state).page().await?))
}

pub(crate) async fn create<R: AdminCollection>(
    State(state): State<Arc<ApiState>>,
    Json(draft): Json<R::Draft>,
) -> Result<(StatusCode, Json<R>), ApiError> {
    let record = R::admin(&state).submit(draft, None).await?;
    state.telemetry.inc_content_write(R::TABLE.as_str(), "insert");
    Ok((StatusCode::CREATED, Json(record)))
}

pub(crate) async fn update<R: AdminCollection>(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(draft): Json<R::Draft>,
) -> Result<Json<R>, ApiError> {
    let id = parse_id(&id)?;
    let record = R::admin(&state).submit(draft, Some(id)).await?;
    state.telemetry.inc_content_write(R::TABLE.as_str(), "update");
    Ok(Json(record))
}

/// Delete once confirmed. Unconfirmed requests are refused with 409 and a
/// repeated delete of the same id answers 404.
pub(crate) async fn remove<R: AdminCollection>(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_id(&id)?;
    let outcome = R::admin(&state).delete(id, query.confirm).await?;
    match outcome {
        DeleteOutcome::Unconfirmed => Err(ApiError::confirmation_required(format!(
            "deleting this {} requires confirm=true",
            R::LABEL
        ))),
        DeleteOutcome::Missing => Err(ApiError::not_found(format!(
            "no live {} with id {id}",
            R::LABEL
        ))),
        DeleteOutcome::Removed | DeleteOutcome::Archived => {
            let op = if outcome == DeleteOutcome::Archived {
                "archive"
            } else {
                "delete"
            };
            state.telemetry.inc_content_write(R::TABLE.as_str(), op);
            Ok(Json(DeleteResponse { id, outcome }))
        }
    }
}

pub(crate) async fn toggle_visibility<R: AdminCollection>(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<R>, ApiError> {
    let id = parse_id(&id)?;
    let record = R::admin(&state).toggle_visibility(id).await?;
    state.telemetry.inc_content_write(R::TABLE.as_str(), "update");
    Ok(Json(record))
}

pub(crate) async fn reorder<R: AdminCollection>(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Vec<R>>, ApiError> {
    let items = R::admin(&state).reorder(&request.ids).await?;
    state.telemetry.inc_content_write(R::TABLE.as_str(), "reorder");
    Ok(Json(items))
}

/// Batch editor save. Failed items are reported in the body, not as an
/// error status.
pub(crate) async fn save_all<R: AdminCollection>(
    State(state): State<Arc<ApiState>>,
    Json(items): Json<Vec<BatchItem<R::Draft>>>,
) -> Json<BatchSaveReport<R>> {
    let report = R::admin(&state).save_all(items).await;
    for _ in &report.saved {
        state.telemetry.inc_content_write(R::TABLE.as_str(), "upsert");
    }
    if !report.failed.is_empty() {
        info!(
            kind = R::LABEL,
            failed = report.failed.len(),
            "batch save left items unsaved"
        );
    }
    Json(report)
}
