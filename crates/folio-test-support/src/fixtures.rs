//! Test fixtures and environment helpers.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

/// Returns `true` when integration suites have a Postgres server to talk to.
#[must_use]
pub fn database_configured() -> bool {
    database_configured_with(std::env::var(crate::postgres::TEST_DATABASE_ENV).ok())
}

fn database_configured_with(value: Option<String>) -> bool {
    value.is_some_and(|url| !url.trim().is_empty())
}

/// Create an empty scratch directory under the system temp dir.
///
/// Callers own cleanup; most suites wrap the path in a guard that removes it.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn scratch_dir(label: &str) -> Result<PathBuf> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("folio-{label}-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create scratch dir {}", dir.display()))?;
    Ok(dir)
}

/// A minimal PNG header, enough for content sniffing in upload tests.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
