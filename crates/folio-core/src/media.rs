//! Upload validation and the blob store contract.
//!
//! Validation runs before any I/O: a rejected file never reaches a
//! [`BlobStore`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Largest accepted upload, in bytes (2 MiB).
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Folder avatar uploads are written to.
pub const AVATAR_FOLDER: &str = "avatars";

/// Errors raised by upload validation and blob stores.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Content type is not an image.
    #[error("unsupported media type")]
    UnsupportedType {
        /// Submitted content type.
        content_type: String,
    },
    /// File exceeds [`MAX_UPLOAD_BYTES`].
    #[error("upload too large")]
    TooLarge {
        /// Submitted size in bytes.
        size: usize,
        /// Accepted maximum in bytes.
        limit: usize,
    },
    /// Path is empty, absolute or escapes the media root.
    #[error("invalid media path")]
    InvalidPath {
        /// Offending path.
        path: String,
    },
    /// Object exists and overwriting was not requested.
    #[error("media object already exists")]
    AlreadyExists {
        /// Existing path.
        path: String,
    },
    /// Backend I/O failed.
    #[error("media storage operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path being written or read.
        path: String,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
}

impl MediaError {
    /// Short label for the rejection metric, `None` for non-validation errors.
    #[must_use]
    pub const fn rejection_reason(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedType { .. } => Some("content_type"),
            Self::TooLarge { .. } => Some("size"),
            Self::InvalidPath { .. } => Some("path"),
            Self::AlreadyExists { .. } | Self::Io { .. } => None,
        }
    }
}

/// Options passed along with an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// MIME type recorded with the object.
    pub content_type: String,
    /// `Cache-Control` max-age in seconds.
    pub cache_control: u32,
    /// Overwrite an existing object at the same path.
    pub upsert: bool,
}

impl UploadOptions {
    /// Options for a new image: one hour cache, no overwrite.
    #[must_use]
    pub fn image(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            cache_control: 3600,
            upsert: false,
        }
    }
}

/// A stored object as listed by the media page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    /// Path relative to the store root.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Public URL.
    pub url: String,
}

/// Blob storage collaborator.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `bytes` at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::AlreadyExists`] when the path is taken and
    /// `options.upsert` is false, [`MediaError::InvalidPath`] for unsafe
    /// paths, and [`MediaError::Io`] on write failure.
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        options: &UploadOptions,
    ) -> Result<(), MediaError>;

    /// Public URL for `path`.
    fn public_url(&self, path: &str) -> String;

    /// Every stored object, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Io`] when the listing fails.
    async fn list(&self) -> Result<Vec<StoredObject>, MediaError>;
}

/// Shared handle to a blob store.
pub type SharedBlobStore = Arc<dyn BlobStore>;

/// Reject anything that is not an image of at most [`MAX_UPLOAD_BYTES`].
///
/// # Errors
///
/// Returns [`MediaError::UnsupportedType`] or [`MediaError::TooLarge`].
pub fn validate_image(content_type: &str, size: usize) -> Result<(), MediaError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("image", subtype)) if !subtype.is_empty() => {}
        _ => {
            return Err(MediaError::UnsupportedType {
                content_type: content_type.to_string(),
            });
        }
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(MediaError::TooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// File extension for an upload: taken from the file name, else from the
/// image subtype.
#[must_use]
pub fn extension_for(file_name: Option<&str>, content_type: &str) -> String {
    let from_name = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    let ext = from_name.unwrap_or_else(|| {
        content_type
            .split(';')
            .next()
            .and_then(|essence| essence.split_once('/'))
            .map_or("bin", |(_, subtype)| subtype.trim())
    });
    match ext.to_ascii_lowercase().as_str() {
        "jpeg" => "jpg".to_string(),
        "svg+xml" => "svg".to_string(),
        other => other.to_string(),
    }
}

/// Storage path for an avatar uploaded at `millis` since the epoch.
#[must_use]
pub fn avatar_path(millis: i64, ext: &str) -> String {
    format!("{AVATAR_FOLDER}/avatar-{millis}.{ext}")
}

/// Normalise a caller-supplied relative path.
///
/// # Errors
///
/// Returns [`MediaError::InvalidPath`] for empty or absolute paths and any
/// `.`/`..` or empty segment.
pub fn sanitize_path(path: &str) -> Result<String, MediaError> {
    let invalid = || MediaError::InvalidPath {
        path: path.to_string(),
    };
    if path.is_empty() || path.starts_with('/') || path.contains('\\') {
        return Err(invalid());
    }
    for segment in path.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(invalid());
        }
    }
    Ok(path.to_string())
}
