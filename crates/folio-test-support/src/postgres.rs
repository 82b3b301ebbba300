//! Throwaway Postgres databases for integration tests.
//!
//! Suites point `FOLIO_TEST_DATABASE_URL` at any reachable server; each call
//! to [`start_postgres`] creates a uniquely named database on it and drops the
//! database again when the handle goes out of scope.

use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use postgres::NoTls;
use url::Url;

/// Environment variable naming the server used by integration suites.
pub const TEST_DATABASE_ENV: &str = "FOLIO_TEST_DATABASE_URL";

/// Handle to a database that lives for the duration of a test.
pub struct TestDatabase {
    connection_string: String,
    admin_url: String,
    name: String,
}

impl TestDatabase {
    /// Connection string that can be handed to `sqlx`.
    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Name of the generated database.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        let statement = format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", self.name);
        let _ = run_admin_statement(&self.admin_url, statement);
    }
}

/// Create a fresh database on the server named by `FOLIO_TEST_DATABASE_URL`.
///
/// # Errors
///
/// Returns an error when the variable is unset, unparsable, or the server
/// refuses the `CREATE DATABASE` statement. Callers usually skip the test in
/// that case.
pub fn start_postgres() -> Result<TestDatabase> {
    let base = std::env::var(TEST_DATABASE_ENV)
        .with_context(|| format!("{TEST_DATABASE_ENV} is not set"))?;
    create_on(&base)
}

fn create_on(base_url: &str) -> Result<TestDatabase> {
    let parsed = Url::parse(base_url).context("invalid postgres connection url")?;
    let name = unique_database_name();

    let mut target = parsed.clone();
    target.set_path(&format!("/{name}"));

    let mut last_error = None;
    for admin_url in admin_candidates(&parsed) {
        match run_admin_statement(&admin_url, format!("CREATE DATABASE \"{name}\"")) {
            Ok(()) => {
                return Ok(TestDatabase {
                    connection_string: target.to_string(),
                    admin_url,
                    name,
                });
            }
            Err(err) => last_error = Some(err),
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("failed to create test database")))
}

fn admin_candidates(base: &Url) -> Vec<String> {
    let mut admin = base.clone();
    admin.set_path("/postgres");
    let mut candidates = vec![admin.to_string()];
    if admin.path() != base.path() {
        candidates.push(base.to_string());
    }
    candidates
}

// The blocking client owns its own runtime, so it must not run on a tokio worker.
fn run_admin_statement(admin_url: &str, statement: String) -> Result<()> {
    let admin_url = admin_url.to_string();
    std::thread::spawn(move || -> Result<()> {
        let config = postgres::Config::from_str(&admin_url)?;
        let mut client = config.connect(NoTls)?;
        client
            .simple_query(&statement)
            .map(|_| ())
            .with_context(|| format!("failed to run `{statement}`"))
    })
    .join()
    .unwrap_or_else(|_| Err(anyhow!("admin statement thread panicked")))
}

fn unique_database_name() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("folio_test_{}_{nanos}", std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_candidates_prefer_maintenance_database() {
        let base = Url::parse("postgres://user:pw@localhost:5432/app").expect("url");
        let candidates = admin_candidates(&base);
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].ends_with("/postgres"));
        assert!(candidates[1].ends_with("/app"));
    }

    #[test]
    fn admin_candidates_deduplicate_postgres_path() {
        let base = Url::parse("postgres://localhost/postgres").expect("url");
        assert_eq!(admin_candidates(&base).len(), 1);
    }

    #[test]
    fn database_names_are_identifier_safe() {
        let name = unique_database_name();
        assert!(name.starts_with("folio_test_"));
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }
}
