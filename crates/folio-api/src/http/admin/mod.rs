//! HQ handlers. Every route here sits behind the session guard.

pub(crate) mod collections;
pub(crate) mod content;
pub(crate) mod dashboard;
pub(crate) mod media;
pub(crate) mod pages;

use uuid::Uuid;

use crate::http::errors::ApiError;

/// Parse a path id. Anything that is not a UUID cannot name a row.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("no record with id {raw}")))
}
