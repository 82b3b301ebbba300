//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Collector registration stays private; callers only see typed
//!   increment/set methods.
//! - Label values are the domain's stable names (table, category, reason),
//!   never free-form user input.

use std::sync::Arc;

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    content_writes_total: IntCounterVec,
    settings_saves_total: IntCounterVec,
    uploads_rejected_total: IntCounterVec,
    active_sessions: IntGauge,
    // Unregistered running totals backing `snapshot`.
    content_writes_seen: IntCounter,
    uploads_rejected_seen: IntCounter,
}

/// Snapshot of selected values for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Sessions currently signed in.
    pub active_sessions: i64,
    /// Content writes across all tables and operations.
    pub content_writes_total: u64,
    /// Uploads rejected before reaching the blob store.
    pub uploads_rejected_total: u64,
}

fn total(name: &'static str) -> Result<IntCounter> {
    IntCounter::new(name, "running total")
        .map_err(|source| TelemetryError::MetricsCollector { name, source })
}

fn counter_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::MetricsCollector { name, source })
}

impl Metrics {
    /// Construct a registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any collector cannot be built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = counter_vec(
            "http_requests_total",
            "Total HTTP requests received",
            &["route", "code"],
        )?;
        let content_writes_total = counter_vec(
            "content_writes_total",
            "Content store writes by table and operation",
            &["table", "op"],
        )?;
        let settings_saves_total = counter_vec(
            "settings_saves_total",
            "Settings group saves by category and outcome",
            &["category", "outcome"],
        )?;
        let uploads_rejected_total = counter_vec(
            "uploads_rejected_total",
            "Uploads rejected before storage by reason",
            &["reason"],
        )?;
        let active_sessions = IntGauge::with_opts(Opts::new(
            "active_sessions",
            "Admin sessions currently signed in",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "active_sessions",
            source,
        })?;

        let register = |name: &'static str, collector: Box<dyn prometheus::core::Collector>| {
            registry
                .register(collector)
                .map_err(|source| TelemetryError::MetricsRegister { name, source })
        };
        register("http_requests_total", Box::new(http_requests_total.clone()))?;
        register("content_writes_total", Box::new(content_writes_total.clone()))?;
        register("settings_saves_total", Box::new(settings_saves_total.clone()))?;
        register(
            "uploads_rejected_total",
            Box::new(uploads_rejected_total.clone()),
        )?;
        register("active_sessions", Box::new(active_sessions.clone()))?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                content_writes_total,
                settings_saves_total,
                uploads_rejected_total,
                active_sessions,
                content_writes_seen: total("content_writes_seen")?,
                uploads_rejected_seen: total("uploads_rejected_seen")?,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Count a content write (`insert`, `update`, `delete`, `upsert`).
    pub fn inc_content_write(&self, table: &str, op: &str) {
        self.inner
            .content_writes_total
            .with_label_values(&[table, op])
            .inc();
        self.inner.content_writes_seen.inc();
    }

    /// Count a settings group save; `outcome` is `saved`, `partial` or `failed`.
    pub fn inc_settings_save(&self, category: &str, outcome: &str) {
        self.inner
            .settings_saves_total
            .with_label_values(&[category, outcome])
            .inc();
    }

    /// Count an upload rejected for `reason` (`content_type`, `size`, `path`).
    pub fn inc_upload_rejected(&self, reason: &str) {
        self.inner
            .uploads_rejected_total
            .with_label_values(&[reason])
            .inc();
        self.inner.uploads_rejected_seen.inc();
    }

    /// Set the active session gauge.
    pub fn set_active_sessions(&self, count: usize) {
        self.inner
            .active_sessions
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the output is not UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the health-relevant values.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            active_sessions: self.inner.active_sessions.get(),
            content_writes_total: self.inner.content_writes_seen.get(),
            uploads_rejected_total: self.inner.uploads_rejected_seen.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_snapshot_reflects_updates() -> Result<()> {
        let metrics = Metrics::new()?;
        metrics.inc_http_request("/admin/goals", 200);
        metrics.inc_content_write("goals", "insert");
        metrics.inc_content_write("goals", "update");
        metrics.inc_content_write("projects", "update");
        metrics.inc_settings_save("hero", "saved");
        metrics.inc_upload_rejected("size");
        metrics.set_active_sessions(2);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.active_sessions, 2);
        assert_eq!(snapshot.content_writes_total, 3);
        assert_eq!(snapshot.uploads_rejected_total, 1);

        let rendered = metrics.render()?;
        assert!(rendered.contains("http_requests_total"));
        assert!(rendered.contains("content_writes_total{"));
        assert!(rendered.contains("table=\"projects\""));
        assert!(rendered.contains("settings_saves_total"));
        assert!(rendered.contains("active_sessions 2"));
        Ok(())
    }

    #[test]
    fn registries_are_independent() -> Result<()> {
        let first = Metrics::new()?;
        let second = Metrics::new()?;
        first.inc_upload_rejected("content_type");
        assert_eq!(second.snapshot().uploads_rejected_total, 0);
        Ok(())
    }
}
