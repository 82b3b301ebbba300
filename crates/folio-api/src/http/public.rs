//! Public site handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use folio_core::model::Project;
use folio_core::public::{HomePage, ProjectCatalog, ProjectFilter};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::http::errors::{ApiError, ProblemInvalidParam};
use crate::state::ApiState;

/// Raw catalog query. Empty values mean "no filter", matching what a
/// cleared `<select>` submits.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CatalogQuery {
    #[serde(rename = "type", default)]
    pub(crate) kind: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<String>,
}

fn parse_filter_value<T: DeserializeOwned>(
    name: &'static str,
    raw: Option<&str>,
) -> Result<Option<T>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    serde_json::from_value(Value::String(raw.to_ascii_lowercase()))
        .map(Some)
        .map_err(|_| {
            ApiError::bad_request(format!("unknown {name} filter '{raw}'")).with_invalid_params(
                vec![ProblemInvalidParam {
                    pointer: format!("/{name}"),
                    message: "unknown_value".to_string(),
                }],
            )
        })
}

impl CatalogQuery {
    pub(crate) fn filter(&self) -> Result<ProjectFilter, ApiError> {
        Ok(ProjectFilter {
            kind: parse_filter_value("type", self.kind.as_deref())?,
            status: parse_filter_value("status", self.status.as_deref())?,
        })
    }
}

pub(crate) async fn home(State(state): State<Arc<ApiState>>) -> Json<HomePage> {
    Json(state.site.home().await)
}

pub(crate) async fn projects(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<ProjectCatalog>, ApiError> {
    let filter = query.filter()?;
    Ok(Json(state.site.projects(filter).await))
}

pub(crate) async fn project(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let not_found = || ApiError::not_found(format!("no project with id {id}"));
    let parsed = Uuid::parse_str(&id).map_err(|_| not_found())?;
    state.site.project(parsed).await.map(Json).ok_or_else(not_found)
}
