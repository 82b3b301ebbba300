//! Typed server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Default HTTP port.
pub const DEFAULT_HTTP_PORT: u16 = 8080;
/// Default session lifetime (12 hours).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);
/// Default media root.
pub const DEFAULT_MEDIA_ROOT: &str = "./media";
/// Default public prefix for media URLs.
pub const DEFAULT_MEDIA_BASE_URL: &str = "/media";

/// Log output style requested through the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStyle {
    /// Structured JSON lines.
    Json,
    /// Human-readable output.
    Pretty,
}

/// The single admin account allowed into HQ.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    /// Login email, compared case-insensitively.
    pub email: String,
    /// PHC-formatted argon2 hash of the password.
    pub password_hash: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Server configuration read once at bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind_addr: IpAddr,
    /// HTTP port (never zero).
    pub http_port: u16,
    /// PostgreSQL connection string; `None` serves the demo dataset.
    pub database_url: Option<String>,
    /// Directory uploaded media is written to.
    pub media_root: PathBuf,
    /// Public URL prefix for media, without trailing slash.
    pub media_base_url: String,
    /// Admin account; `None` disables sign-in.
    pub admin: Option<AdminCredentials>,
    /// Session lifetime.
    pub session_ttl: Duration,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Explicit log style; `None` infers from the build profile.
    pub log_style: Option<LogStyle>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            http_port: DEFAULT_HTTP_PORT,
            database_url: None,
            media_root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            media_base_url: DEFAULT_MEDIA_BASE_URL.to_string(),
            admin: None,
            session_ttl: DEFAULT_SESSION_TTL,
            log_level: "info".to_string(),
            log_style: None,
        }
    }
}

impl ServerConfig {
    /// Socket address the HTTP listener binds.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }

    /// Whether content is served from the in-memory demo dataset.
    #[must_use]
    pub const fn is_demo(&self) -> bool {
        self.database_url.is_none()
    }
}
