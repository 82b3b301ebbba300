//! Application span and per-request context.
//!
//! # Design
//! - The application span carries the serving mode (`demo` or `live`) and
//!   the build SHA for the lifetime of the process.
//! - Request identifiers live in task-local storage so error mapping deep in
//!   a handler can log them without threading the id through every call.

use std::future::Future;
use std::sync::Arc;

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the application-level span entered for the lifetime of the process.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the application span, recording `mode` and the build SHA.
    #[must_use]
    pub fn new(mode: impl Into<String>) -> Self {
        let mode = mode.into();
        let span: &'static Span = Box::leak(Box::new(
            tracing::info_span!("app", mode = %mode, build_sha = %build_sha()),
        ));
        let guard = span.enter();
        Self { _guard: guard }
    }
}

/// Record the current application mode on the active span.
pub fn record_app_mode(mode: &str) {
    Span::current().record("mode", tracing::field::display(mode));
}

/// Request identifier of the request being served by this task, if any.
#[must_use]
pub fn current_request_id() -> Option<String> {
    ACTIVE_REQUEST_ID.try_with(ToString::to_string).ok()
}

/// Run `fut` with `request_id` visible through [`current_request_id`].
pub async fn with_request_context<Fut, T>(request_id: impl Into<String>, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    let request_id: Arc<str> = Arc::from(request_id.into());
    ACTIVE_REQUEST_ID.scope(request_id, fut).await
}

tokio::task_local! {
    static ACTIVE_REQUEST_ID: Arc<str>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_context_guard_records_mode() {
        let guard = GlobalContextGuard::new("demo");
        record_app_mode("live");
        drop(guard);
    }

    #[tokio::test]
    async fn request_id_is_scoped_to_the_future() {
        let output = with_request_context("req-42", async {
            assert_eq!(current_request_id().as_deref(), Some("req-42"));
            "done"
        })
        .await;
        assert_eq!(output, "done");
        assert!(current_request_id().is_none());
    }
}
