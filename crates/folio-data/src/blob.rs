//! Local filesystem blob store serving uploaded media.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use folio_core::media::{BlobStore, MediaError, StoredObject, UploadOptions, sanitize_path};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{DataError, Result};

/// Blob store writing objects under a root directory.
///
/// The filesystem keeps no per-object metadata: content type and cache
/// lifetime are applied by the HTTP layer that serves the root.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    /// Open (creating if needed) a store rooted at `root` whose objects are
    /// published under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::MediaRootUnavailable`] when the root cannot be created.
    pub async fn open(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| DataError::MediaRootUnavailable {
                path: root.clone(),
                source,
            })?;
        Ok(Self {
            root,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Directory objects are written to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn io_error<'a>(operation: &'static str, path: &'a str) -> impl FnOnce(std::io::Error) -> MediaError + 'a {
    move |source| MediaError::Io {
        operation,
        path: path.to_string(),
        source,
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        options: &UploadOptions,
    ) -> std::result::Result<(), MediaError> {
        let relative = sanitize_path(path)?;
        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(io_error("create_dir", &relative))?;
        }

        let mut open = tokio::fs::OpenOptions::new();
        open.write(true);
        if options.upsert {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }
        let mut file = open.open(&target).await.map_err(|source| {
            if source.kind() == ErrorKind::AlreadyExists {
                MediaError::AlreadyExists {
                    path: relative.clone(),
                }
            } else {
                io_error("open", &relative)(source)
            }
        })?;
        file.write_all(bytes)
            .await
            .map_err(io_error("write", &relative))?;
        file.flush().await.map_err(io_error("flush", &relative))?;

        info!(
            path = %relative,
            size = bytes.len(),
            content_type = %options.content_type,
            "media stored"
        );
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn list(&self) -> std::result::Result<Vec<StoredObject>, MediaError> {
        let mut objects = Vec::new();
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let label = dir.display().to_string();
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(io_error("read_dir", &label))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(io_error("read_dir", &label))?
            {
                let metadata = entry
                    .metadata()
                    .await
                    .map_err(io_error("metadata", &label))?;
                let entry_path = entry.path();
                if metadata.is_dir() {
                    pending.push(entry_path);
                    continue;
                }
                let Ok(relative) = entry_path.strip_prefix(&self.root) else {
                    continue;
                };
                let path = relative
                    .components()
                    .map(|component| component.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                objects.push(StoredObject {
                    url: self.public_url(&path),
                    path,
                    size: metadata.len(),
                });
            }
        }
        objects.sort_by(|left, right| left.path.cmp(&right.path));
        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, LocalBlobStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalBlobStore::open(dir.path().join("media"), "/media/")
            .await
            .expect("open");
        (dir, store)
    }

    #[tokio::test]
    async fn uploads_refuse_to_overwrite_without_upsert() {
        let (_dir, store) = store().await;
        let options = UploadOptions::image("image/png");
        store
            .upload("avatars/avatar-1.png", b"first", &options)
            .await
            .expect("first upload");
        let err = store
            .upload("avatars/avatar-1.png", b"second", &options)
            .await
            .expect_err("duplicate rejected");
        assert!(matches!(err, MediaError::AlreadyExists { .. }));

        let overwrite = UploadOptions {
            upsert: true,
            ..options
        };
        store
            .upload("avatars/avatar-1.png", b"third", &overwrite)
            .await
            .expect("upsert");
        let stored = tokio::fs::read(store.root().join("avatars/avatar-1.png"))
            .await
            .expect("read back");
        assert_eq!(stored, b"third");
    }

    #[tokio::test]
    async fn traversal_never_touches_the_filesystem() {
        let (dir, store) = store().await;
        let err = store
            .upload("../escape.png", b"x", &UploadOptions::image("image/png"))
            .await
            .expect_err("rejected");
        assert!(matches!(err, MediaError::InvalidPath { .. }));
        assert!(!dir.path().join("escape.png").exists());
    }

    #[tokio::test]
    async fn listing_is_sorted_with_public_urls() {
        let (_dir, store) = store().await;
        let options = UploadOptions::image("image/png");
        for path in ["b.png", "avatars/a.png"] {
            store.upload(path, b"img", &options).await.expect("upload");
        }
        let listed = store.list().await.expect("list");
        let paths: Vec<&str> = listed.iter().map(|object| object.path.as_str()).collect();
        assert_eq!(paths, vec!["avatars/a.png", "b.png"]);
        assert_eq!(listed[0].url, "/media/avatars/a.png");
        assert_eq!(listed[0].size, 3);
    }
}
