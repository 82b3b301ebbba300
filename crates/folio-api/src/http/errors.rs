//! RFC 9457 problem documents and the mapping from service errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use folio_core::admin::AdminError;
use folio_core::media::MediaError;
use folio_core::model::ValidationErrors;
use folio_core::session::SessionError;
use folio_core::settings::SettingsError;
use folio_core::store::StoreError;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::http::constants::{
    PROBLEM_BAD_REQUEST, PROBLEM_CONFIRMATION_REQUIRED, PROBLEM_CONFLICT, PROBLEM_INTERNAL,
    PROBLEM_NOT_FOUND, PROBLEM_SERVICE_UNAVAILABLE, PROBLEM_UNAUTHORIZED,
    PROBLEM_UNSUPPORTED_MEDIA, PROBLEM_UPLOAD_TOO_LARGE, PROBLEM_VALIDATION,
};

/// Problem document returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Short, human-readable summary.
    pub title: String,
    /// HTTP status code.
    pub status: u16,
    /// Detailed message when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Fields that failed validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_params: Option<Vec<ProblemInvalidParam>>,
}

/// One offending field of a [`ProblemDetails`] payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemInvalidParam {
    /// JSON Pointer to the field.
    pub pointer: String,
    /// Machine-readable reason.
    pub message: String,
}

/// Structured API error rendered as a problem document.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) kind: &'static str,
    title: &'static str,
    detail: Option<String>,
    pub(crate) invalid_params: Option<Vec<ProblemInvalidParam>>,
}

impl ApiError {
    const fn new(status: StatusCode, kind: &'static str, title: &'static str) -> Self {
        Self {
            status,
            kind,
            title,
            detail: None,
            invalid_params: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub(crate) fn with_invalid_params(mut self, params: Vec<ProblemInvalidParam>) -> Self {
        self.invalid_params = Some(params);
        self
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            PROBLEM_INTERNAL,
            "internal server error",
        )
        .with_detail(message)
    }

    pub(crate) fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            PROBLEM_UNAUTHORIZED,
            "authentication required",
        )
        .with_detail(detail)
    }

    pub(crate) fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, PROBLEM_BAD_REQUEST, "bad request").with_detail(detail)
    }

    pub(crate) fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, PROBLEM_NOT_FOUND, "resource not found")
            .with_detail(detail)
    }

    pub(crate) fn conflict(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, PROBLEM_CONFLICT, "conflict").with_detail(detail)
    }

    pub(crate) fn confirmation_required(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::CONFLICT,
            PROBLEM_CONFIRMATION_REQUIRED,
            "confirmation required",
        )
        .with_detail(detail)
    }

    pub(crate) fn validation(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            PROBLEM_VALIDATION,
            "validation failed",
        )
        .with_detail(detail)
    }

    pub(crate) fn upload_too_large(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            PROBLEM_UPLOAD_TOO_LARGE,
            "upload too large",
        )
        .with_detail(detail)
    }

    pub(crate) fn unsupported_media(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            PROBLEM_UNSUPPORTED_MEDIA,
            "unsupported media type",
        )
        .with_detail(detail)
    }

    pub(crate) fn service_unavailable(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            PROBLEM_SERVICE_UNAVAILABLE,
            "service unavailable",
        )
        .with_detail(detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ProblemDetails {
            kind: self.kind.to_string(),
            title: self.title.to_string(),
            status: self.status.as_u16(),
            detail: self.detail,
            invalid_params: self.invalid_params,
        };
        (self.status, Json(body)).into_response()
    }
}

fn pointer(field: &str) -> String {
    format!("/{field}")
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let params = errors
            .issues
            .iter()
            .map(|issue| ProblemInvalidParam {
                pointer: pointer(issue.field),
                message: issue.reason.to_string(),
            })
            .collect();
        Self::validation("draft failed validation; nothing was saved").with_invalid_params(params)
    }
}

fn from_store(operation: &str, source: &StoreError) -> ApiError {
    match source {
        StoreError::Conflict { table, column } => ApiError::conflict(format!(
            "{table} already has a row with this {column}"
        ))
        .with_invalid_params(vec![ProblemInvalidParam {
            pointer: pointer(column),
            message: "duplicate".to_string(),
        }]),
        StoreError::UnknownColumn { column, .. } => {
            ApiError::validation("unknown field").with_invalid_params(vec![ProblemInvalidParam {
                pointer: pointer(column),
                message: "unknown_column".to_string(),
            }])
        }
        StoreError::InvalidRow { reason, .. } => {
            warn!(operation, reason, "store rejected row");
            ApiError::validation(format!("row rejected: {reason}"))
        }
        StoreError::Decode { .. } | StoreError::Backend { .. } => {
            error!(operation, error = %source, cause = ?std::error::Error::source(source), "content store failure");
            ApiError::internal("the content store could not complete the request")
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Invalid(errors) => errors.into(),
            AdminError::NotFound { table, id } => {
                Self::not_found(format!("no {table} row with id {id}"))
            }
            AdminError::Unsupported { table, operation } => {
                Self::bad_request(format!("{table} does not support {operation}"))
            }
            AdminError::Store { operation, source } => from_store(operation, &source),
        }
    }
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::UnknownField { category, field } => {
                Self::validation(format!("{category} settings have no such field"))
                    .with_invalid_params(vec![ProblemInvalidParam {
                        pointer: pointer(&field),
                        message: "unknown_field".to_string(),
                    }])
            }
            SettingsError::TypeMismatch {
                category,
                field,
                expected,
            } => Self::validation(format!("{category} settings value has the wrong type"))
                .with_invalid_params(vec![ProblemInvalidParam {
                    pointer: pointer(&field),
                    message: format!("expected_{}", expected.as_str()),
                }]),
            SettingsError::Document { category, source } => {
                Self::validation(format!("{category} settings are malformed: {source}"))
            }
            SettingsError::Store { operation, source } => from_store(operation, &source),
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::UnsupportedType { content_type } => {
                Self::unsupported_media(format!("'{content_type}' is not an image"))
            }
            MediaError::TooLarge { size, limit } => {
                Self::upload_too_large(format!("{size} bytes exceeds the {limit} byte limit"))
            }
            MediaError::InvalidPath { path } => {
                Self::bad_request(format!("'{path}' is not a valid media path"))
            }
            MediaError::AlreadyExists { path } => {
                Self::conflict(format!("'{path}' already exists"))
            }
            MediaError::Io {
                operation,
                path,
                source,
            } => {
                error!(operation, path = %path, error = %source, "media storage failure");
                Self::internal("the media store could not complete the request")
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidCredentials => Self::unauthorized("invalid email or password"),
            SessionError::Unavailable { operation, source } => {
                error!(operation, error = %source, "session provider failure");
                Self::service_unavailable("sign-in is currently unavailable")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::model::FieldIssue;
    use folio_core::store::Table;
    use uuid::Uuid;

    #[test]
    fn validation_errors_carry_field_pointers() {
        let err: ApiError = ValidationErrors {
            issues: vec![FieldIssue {
                field: "name",
                reason: "required",
            }],
        }
        .into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.kind, PROBLEM_VALIDATION);
        let params = err.invalid_params.expect("params");
        assert_eq!(params[0].pointer, "/name");
        assert_eq!(params[0].message, "required");
    }

    #[test]
    fn admin_errors_map_to_statuses() {
        let missing: ApiError = AdminError::NotFound {
            table: Table::Goals,
            id: Uuid::nil(),
        }
        .into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let backend: ApiError = AdminError::Store {
            operation: "collection.load",
            source: StoreError::Backend {
                operation: "select",
                table: Table::Goals,
                source: "connection reset".into(),
            },
        }
        .into();
        assert_eq!(backend.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            backend.detail.as_deref(),
            Some("the content store could not complete the request")
        );
    }

    #[test]
    fn upload_rejections_use_dedicated_statuses() {
        let too_large: ApiError = MediaError::TooLarge { size: 3, limit: 2 }.into();
        assert_eq!(too_large.status, StatusCode::PAYLOAD_TOO_LARGE);
        let wrong_type: ApiError = MediaError::UnsupportedType {
            content_type: "text/plain".into(),
        }
        .into();
        assert_eq!(wrong_type.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn problem_document_serializes_type_field() {
        let body = ProblemDetails {
            kind: PROBLEM_NOT_FOUND.to_string(),
            title: "resource not found".to_string(),
            status: 404,
            detail: None,
            invalid_params: None,
        };
        let json = serde_json::to_value(&body).expect("json");
        assert_eq!(json["type"], PROBLEM_NOT_FOUND);
        assert!(json.get("detail").is_none());
    }
}
