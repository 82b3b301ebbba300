//! Settings-backed pages: profile, navbar, site metadata and appearance.

use std::sync::Arc;

use axum::{Json, extract::State};
use folio_core::model::{SectionConfig, SectionName};
use folio_core::settings::{
    NavbarSettings, ProfileSettings, SaveReport, SectionUpdate, SettingsDocument, SiteMetadata,
    ThemeSettings,
};
use serde::{Deserialize, Serialize};

use crate::http::errors::{ApiError, ProblemInvalidParam};
use crate::state::ApiState;

/// Save a settings document and turn a partial write into an error that
/// lists every key left unsaved.
pub(crate) async fn save_document<D: SettingsDocument>(
    state: &ApiState,
    document: &D,
) -> Result<Json<SaveReport>, ApiError> {
    let report = state.settings.save(document).await?;
    let category = report.category.as_str();
    let Some(failure) = &report.outcome.failed else {
        state.telemetry.inc_settings_save(category, "saved");
        return Ok(Json(report));
    };

    state.telemetry.inc_settings_save(category, "failed");
    let unsaved = std::iter::once(&failure.key)
        .chain(report.outcome.not_applied.iter())
        .map(|key| ProblemInvalidParam {
            pointer: format!("/{key}"),
            message: "not_saved".to_string(),
        })
        .collect();
    Err(ApiError::internal(format!(
        "{} settings were not saved ({} of {} fields written)",
        report.category,
        report.outcome.applied.len(),
        report.outcome.applied.len() + 1 + report.outcome.not_applied.len()
    ))
    .with_invalid_params(unsaved))
}

async fn load_document<D: SettingsDocument>(state: &ApiState) -> Result<Json<D>, ApiError> {
    Ok(Json(state.settings.load::<D>().await?))
}

pub(crate) async fn profile(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ProfileSettings>, ApiError> {
    load_document(&state).await
}

pub(crate) async fn save_profile(
    State(state): State<Arc<ApiState>>,
    Json(document): Json<ProfileSettings>,
) -> Result<Json<SaveReport>, ApiError> {
    save_document(&state, &document).await
}

pub(crate) async fn navbar(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<NavbarSettings>, ApiError> {
    load_document(&state).await
}

pub(crate) async fn save_navbar(
    State(state): State<Arc<ApiState>>,
    Json(document): Json<NavbarSettings>,
) -> Result<Json<SaveReport>, ApiError> {
    save_document(&state, &document).await
}

pub(crate) async fn site_settings(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<SiteMetadata>, ApiError> {
    load_document(&state).await
}

pub(crate) async fn save_site_settings(
    State(state): State<Arc<ApiState>>,
    Json(document): Json<SiteMetadata>,
) -> Result<Json<SaveReport>, ApiError> {
    save_document(&state, &document).await
}

#[derive(Debug, Serialize)]
pub(crate) struct AppearancePage {
    pub(crate) sections: Vec<SectionConfig>,
    pub(crate) theme: ThemeSettings,
}

pub(crate) async fn appearance(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<AppearancePage>, ApiError> {
    let (sections, theme) = tokio::join!(
        state.settings.sections(),
        state.settings.load::<ThemeSettings>()
    );
    Ok(Json(AppearancePage {
        sections: sections?,
        theme: theme?,
    }))
}

pub(crate) async fn save_theme(
    State(state): State<Arc<ApiState>>,
    Json(document): Json<ThemeSettings>,
) -> Result<Json<SaveReport>, ApiError> {
    save_document(&state, &document).await
}

pub(crate) async fn save_sections(
    State(state): State<Arc<ApiState>>,
    Json(updates): Json<Vec<SectionUpdate>>,
) -> Result<Json<Vec<SectionConfig>>, ApiError> {
    let sections = state.settings.save_sections(updates).await?;
    state.telemetry.inc_content_write("section_config", "upsert");
    Ok(Json(sections))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SectionOrderRequest {
    pub(crate) sections: Vec<SectionName>,
}

pub(crate) async fn reorder_sections(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SectionOrderRequest>,
) -> Result<Json<Vec<SectionConfig>>, ApiError> {
    let sections = state.settings.reorder_sections(&request.sections).await?;
    state.telemetry.inc_content_write("section_config", "reorder");
    Ok(Json(sections))
}
