//! Health and diagnostics endpoints.

use std::sync::Arc;

use axum::{Json, body::Body, extract::State, http::StatusCode, response::Response};
use folio_core::store::{Query, Table};
use folio_telemetry::{build_sha, record_app_mode};
use serde::Serialize;
use tracing::{error, warn};

use crate::http::errors::ApiError;
use crate::state::{ApiState, ContentSource};

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) source: ContentSource,
    pub(crate) build: String,
    pub(crate) metrics: HealthMetricsResponse,
}

#[derive(Serialize)]
pub(crate) struct HealthMetricsResponse {
    pub(crate) active_sessions: i64,
    pub(crate) content_writes_total: u64,
    pub(crate) uploads_rejected_total: u64,
}

pub(crate) async fn health(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    record_app_mode(state.source.as_str());
    if let Err(err) = state.store.count(&Query::from(Table::SectionConfig)).await {
        warn!(error = %err, "health check failed to reach the content store");
        return Err(ApiError::service_unavailable(
            "content store is currently unavailable",
        ));
    }

    let snapshot = state.telemetry.snapshot();
    Ok(Json(HealthResponse {
        status: "ok",
        source: state.source,
        build: build_sha().to_string(),
        metrics: HealthMetricsResponse {
            active_sessions: snapshot.active_sessions,
            content_writes_total: snapshot.content_writes_total,
            uploads_rejected_total: snapshot.uploads_rejected_total,
        },
    }))
}

pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    match state.telemetry.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )
            .body(Body::from(body))
            .map_err(|err| {
                error!(error = %err, "failed to build metrics response");
                ApiError::internal("failed to build metrics response")
            }),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            Err(ApiError::internal("failed to render metrics"))
        }
    }
}
