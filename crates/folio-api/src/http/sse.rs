//! Event stream for open admin pages.
//!
//! Every bus event is forwarded; when the guarded session ends or lapses the
//! stream emits a final `redirect` event carrying the login route and closes.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use axum::{
    Extension,
    extract::State,
    http::HeaderMap,
    response::sse::{self, Sse},
};
use chrono::Utc;
use folio_core::session::{GuardState, LOGIN_ROUTE, Session, SessionGuard};
use folio_events::{EventEnvelope, EventId, EventStream};
use tracing::{debug, error};

use crate::http::constants::{HEADER_LAST_EVENT_ID, REDIRECT_EVENT, SSE_KEEP_ALIVE_SECS};
use crate::state::ApiState;

pub(crate) async fn stream_events(
    State(state): State<Arc<ApiState>>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
) -> Sse<impl futures_core::Stream<Item = Result<sse::Event, Infallible>> + Send> {
    let last_id = headers
        .get(HEADER_LAST_EVENT_ID)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<EventId>().ok());

    let events = match last_id {
        Some(_) => state.events.subscribe(last_id),
        None => state.sessions.provider().subscribe(),
    };
    let mut guard = state.sessions.guard();
    guard.check(Some(&session.token)).await;

    Sse::new(session_event_stream(guard, events)).keep_alive(
        sse::KeepAlive::new()
            .interval(Duration::from_secs(SSE_KEEP_ALIVE_SECS))
            .text("keep-alive"),
    )
}

fn envelope_event(envelope: &EventEnvelope) -> Option<sse::Event> {
    match serde_json::to_string(envelope) {
        Ok(payload) => Some(
            sse::Event::default()
                .id(envelope.id.to_string())
                .event(envelope.event.kind())
                .data(payload),
        ),
        Err(err) => {
            error!(error = %err, "failed to serialise SSE event payload");
            None
        }
    }
}

enum Step {
    Event(EventEnvelope),
    Lapsed,
    Closed,
}

fn time_left(session: &Session) -> Duration {
    (session.expires_at - Utc::now())
        .to_std()
        .unwrap_or(Duration::ZERO)
}

pub(crate) fn session_event_stream(
    mut guard: SessionGuard,
    mut events: EventStream,
) -> impl futures_core::Stream<Item = Result<sse::Event, Infallible>> + Send {
    stream! {
        let Some(left) = guard.session().map(time_left) else {
            yield Ok(redirect_event(LOGIN_ROUTE));
            return;
        };
        let mut lapse = Box::pin(tokio::time::sleep(left));
        loop {
            let step = tokio::select! {
                biased;
                () = &mut lapse => Step::Lapsed,
                next = events.next() => next.map_or(Step::Closed, Step::Event),
            };
            match step {
                Step::Event(envelope) => {
                    if let Some(event) = envelope_event(&envelope) {
                        yield Ok(event);
                    }
                    if let GuardState::Redirecting { to } = guard.observe(&envelope.event).clone() {
                        debug!(to, "guarded session ended; redirecting stream");
                        yield Ok(redirect_event(to));
                        break;
                    }
                }
                Step::Lapsed => {
                    if let GuardState::Redirecting { to } = guard.recheck().await.clone() {
                        debug!(to, "guarded session expired; redirecting stream");
                        yield Ok(redirect_event(to));
                        break;
                    }
                    let left = guard
                        .session()
                        .map_or(Duration::ZERO, time_left)
                        .max(Duration::from_millis(10));
                    lapse
                        .as_mut()
                        .reset(tokio::time::Instant::now() + left);
                }
                Step::Closed => break,
            }
        }
    }
}

fn redirect_event(to: &'static str) -> sse::Event {
    sse::Event::default().event(REDIRECT_EVENT).data(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use axum::response::IntoResponse;
    use folio_events::{ContentAction, Event};

    #[tokio::test]
    async fn lapsed_session_is_redirected_without_further_events() -> anyhow::Result<()> {
        let fixture = Fixture::with_session_ttl(Duration::from_millis(50));
        let session = fixture.sign_in().await;
        let mut guard = fixture.state.sessions.guard();
        guard.check(Some(&session.token)).await;
        let stream = session_event_stream(guard, fixture.events.subscribe(None));

        tokio::time::sleep(Duration::from_millis(200)).await;
        fixture.events.publish(Event::ContentChanged {
            table: "goals".into(),
            id: None,
            action: ContentAction::Updated,
        });

        let body = tokio::time::timeout(
            Duration::from_secs(5),
            axum::body::to_bytes(Sse::new(stream).into_response().into_body(), usize::MAX),
        )
        .await??;
        let text = String::from_utf8(body.to_vec())?;
        assert!(text.contains("event: redirect\ndata: /admin/login"), "{text}");
        assert!(!text.contains("\"table\":\"goals\""), "{text}");
        assert_eq!(fixture.metrics.snapshot().active_sessions, 0);
        Ok(())
    }

    #[tokio::test]
    async fn unauthenticated_guard_redirects_immediately() -> anyhow::Result<()> {
        let fixture = Fixture::demo();
        let stream = session_event_stream(
            fixture.state.sessions.guard(),
            fixture.events.subscribe(None),
        );
        let body = tokio::time::timeout(
            Duration::from_secs(5),
            axum::body::to_bytes(Sse::new(stream).into_response().into_body(), usize::MAX),
        )
        .await??;
        let text = String::from_utf8(body.to_vec())?;
        assert!(text.contains("event: redirect\ndata: /admin/login"), "{text}");
        Ok(())
    }
}
