//! HQ landing page and the repository overview.

use std::sync::Arc;

use axum::{Json, extract::State};
use folio_core::admin::{DashboardCounts, dashboard as collect_counts, repositories};
use folio_core::model::Project;
use serde::Serialize;
use tracing::warn;

use crate::http::errors::ApiError;
use crate::state::ApiState;

#[derive(Debug, Serialize)]
pub(crate) struct DashboardResponse {
    #[serde(flatten)]
    pub(crate) counts: DashboardCounts,
    pub(crate) status_drift: bool,
}

pub(crate) async fn dashboard(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let counts = collect_counts(state.store.as_ref()).await?;
    let status_drift = counts.has_status_drift();
    if status_drift {
        warn!(
            vocabularies = ?counts.goal_status_vocabularies,
            "goals mix both status vocabularies"
        );
    }
    Ok(Json(DashboardResponse {
        counts,
        status_drift,
    }))
}

pub(crate) async fn github(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(repositories(state.store.as_ref()).await?))
}
