//! Uploads: the profile avatar and the generic media library.
//!
//! Bodies are the raw file bytes. The MIME type comes from `Content-Type`
//! and the original file name, if any, from `x-file-name`. Bodies cut off by
//! the transport limit are reported like any other oversized upload.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{
        HeaderMap, StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
    },
};
use chrono::Utc;
use folio_core::media::{
    MAX_UPLOAD_BYTES, MediaError, StoredObject, UploadOptions, avatar_path, extension_for,
    validate_image,
};
use folio_core::settings::{ProfileSettings, SettingsDocument};
use folio_events::Event;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::http::constants::{HEADER_FILE_NAME, UPLOAD_FOLDER};
use crate::http::errors::ApiError;
use crate::state::ApiState;

#[derive(Debug, Serialize)]
pub(crate) struct UploadResponse {
    pub(crate) path: String,
    pub(crate) url: String,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn reject(state: &ApiState, err: MediaError) -> ApiError {
    if let Some(reason) = err.rejection_reason() {
        state.telemetry.inc_upload_rejected(reason);
    }
    err.into()
}

/// Validate, then write the body under a path derived from the upload time.
async fn store_image(
    state: &ApiState,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
    path_for: impl FnOnce(i64, &str) -> String,
) -> Result<UploadResponse, ApiError> {
    let content_type = header(headers, CONTENT_TYPE.as_str()).unwrap_or_default();
    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            let size = header(headers, CONTENT_LENGTH.as_str())
                .and_then(|value| value.parse().ok())
                .unwrap_or(MAX_UPLOAD_BYTES + 1);
            let err = validate_image(content_type, size).err().unwrap_or(
                MediaError::TooLarge {
                    size,
                    limit: MAX_UPLOAD_BYTES,
                },
            );
            return Err(reject(state, err));
        }
        Err(rejection) => return Err(ApiError::bad_request(rejection.body_text())),
    };
    if let Err(err) = validate_image(content_type, body.len()) {
        return Err(reject(state, err));
    }

    let ext = extension_for(header(headers, HEADER_FILE_NAME), content_type);
    let path = path_for(Utc::now().timestamp_millis(), &ext);
    state
        .blobs
        .upload(&path, &body, &UploadOptions::image(content_type))
        .await?;
    let url = state.blobs.public_url(&path);
    state.events.publish(Event::MediaUploaded { path: path.clone() });
    info!(path = %path, size = body.len(), "media uploaded");
    Ok(UploadResponse { path, url })
}

/// Upload a new avatar and point the profile's `avatar_url` at it.
pub(crate) async fn upload_avatar(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let upload = store_image(&state, &headers, body, avatar_path).await?;
    state
        .settings
        .save_field(
            &ProfileSettings::GROUP,
            "avatar_url",
            Value::String(upload.url.clone()),
        )
        .await?;
    state.telemetry.inc_settings_save("profile", "saved");
    Ok(Json(upload))
}

pub(crate) fn upload_path(millis: i64, ext: &str) -> String {
    format!("{UPLOAD_FOLDER}/upload-{millis}.{ext}")
}

pub(crate) async fn list_media(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<StoredObject>>, ApiError> {
    Ok(Json(state.blobs.list().await?))
}

pub(crate) async fn upload_media(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let upload = store_image(&state, &headers, body, upload_path).await?;
    Ok((StatusCode::CREATED, Json(upload)))
}
