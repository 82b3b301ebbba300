//! Static snapshot of the public site.
//!
//! Writes `index.json` (home page), `projects.json` (unfiltered catalog) and
//! `projects/<id>.json` (one per live project) under the output directory.

use std::path::{Path, PathBuf};

use folio_core::PublicSite;
use folio_core::public::ProjectFilter;
use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Files produced by one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Every file written, in write order.
    pub files: Vec<PathBuf>,
}

async fn write_json<T: Serialize>(path: PathBuf, document: &T) -> AppResult<PathBuf> {
    let bytes = serde_json::to_vec_pretty(document).map_err(|source| AppError::Encode {
        path: path.clone(),
        source,
    })?;
    tokio::fs::write(&path, bytes)
        .await
        .map_err(AppError::io("export.write", &path))?;
    debug!(path = %path.display(), "export file written");
    Ok(path)
}

/// Render every public route of `site` into `out_dir`.
///
/// # Errors
///
/// Returns [`AppError::Io`] when a directory or file cannot be written and
/// [`AppError::Encode`] when a document fails to serialise.
pub async fn write_snapshot(site: &PublicSite, out_dir: &Path) -> AppResult<ExportSummary> {
    let projects_dir = out_dir.join("projects");
    tokio::fs::create_dir_all(&projects_dir)
        .await
        .map_err(AppError::io("export.create_dir", &projects_dir))?;

    let mut files = vec![
        write_json(out_dir.join("index.json"), &site.home().await).await?,
        write_json(
            out_dir.join("projects.json"),
            &site.projects(ProjectFilter::default()).await,
        )
        .await?,
    ];
    for id in site.project_ids().await {
        if let Some(project) = site.project(id).await {
            files.push(write_json(projects_dir.join(format!("{id}.json")), &project).await?);
        }
    }
    Ok(ExportSummary { files })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use folio_core::demo::demo_store;
    use serde_json::Value;

    use super::*;

    #[tokio::test]
    async fn demo_snapshot_covers_home_catalog_and_projects() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let site = PublicSite::new(Arc::new(demo_store()?));

        let summary = write_snapshot(&site, dir.path()).await?;
        assert_eq!(summary.files.len(), 5);

        let catalog: Value =
            serde_json::from_slice(&tokio::fs::read(dir.path().join("projects.json")).await?)?;
        let items = catalog["items"].as_array().cloned().unwrap_or_default();
        assert_eq!(items.len(), 3);
        for item in &items {
            let id = item["id"].as_str().unwrap_or_default();
            let page: Value = serde_json::from_slice(
                &tokio::fs::read(dir.path().join("projects").join(format!("{id}.json"))).await?,
            )?;
            assert_eq!(page["name"], item["name"]);
        }

        let home: Value =
            serde_json::from_slice(&tokio::fs::read(dir.path().join("index.json")).await?)?;
        assert!(home["sections"].is_array());
        Ok(())
    }

    #[tokio::test]
    async fn empty_store_still_exports_home_and_catalog() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let site = PublicSite::new(Arc::new(folio_core::MemoryStore::new()));
        let summary = write_snapshot(&site, &dir.path().join("nested")).await?;
        assert_eq!(summary.files.len(), 2);
        assert!(dir.path().join("nested/projects").is_dir());
        Ok(())
    }
}
