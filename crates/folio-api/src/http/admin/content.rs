//! The hero content page: hero copy plus the badge and social link editors.

use std::sync::Arc;

use axum::{Json, extract::State};
use folio_core::model::{HeroBadge, SocialLink};
use folio_core::settings::{HeroSettings, SaveReport};
use serde::Serialize;

use super::pages::save_document;
use crate::http::errors::ApiError;
use crate::state::{AdminCollection, ApiState};

#[derive(Debug, Serialize)]
pub(crate) struct ContentPage {
    pub(crate) hero: HeroSettings,
    pub(crate) badges: Vec<HeroBadge>,
    pub(crate) social_links: Vec<SocialLink>,
}

pub(crate) async fn content(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ContentPage>, ApiError> {
    let (hero, badges, social_links) = tokio::join!(
        state.settings.load::<HeroSettings>(),
        HeroBadge::admin(&state).load(),
        SocialLink::admin(&state).load(),
    );
    Ok(Json(ContentPage {
        hero: hero?,
        badges: badges?,
        social_links: social_links?,
    }))
}

pub(crate) async fn save_hero(
    State(state): State<Arc<ApiState>>,
    Json(document): Json<HeroSettings>,
) -> Result<Json<SaveReport>, ApiError> {
    save_document(&state, &document).await
}
