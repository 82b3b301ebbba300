//! Admin session contract, the route guard state machine and the scoped
//! session lifecycle.
//!
//! # Design
//!
//! - [`SessionProvider`] is the auth collaborator: current session lookup,
//!   sign-in, sign-out and change notifications (published on the
//!   [`EventBus`] as `session_started` / `session_ended`).
//! - [`SessionGuard`] is the three-state guard wrapped around every admin
//!   resource. It never surfaces an error; absence always means redirect.
//! - [`SessionScope`] owns the provider for the lifetime of the application.
//!   It is created at start-up, handed to whoever needs it, and torn down on
//!   shutdown. There is no process-wide session singleton.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_events::{Event, EventBus, EventStream, SessionEndReason};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Route unauthenticated admin requests are sent to.
pub const LOGIN_ROUTE: &str = "/admin/login";

/// An authenticated admin session.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct Session {
    /// Session identifier, safe to expose.
    pub id: Uuid,
    /// Signed-in admin.
    pub email: String,
    /// Bearer secret. Never serialized.
    #[serde(skip_serializing)]
    pub token: String,
    /// Sign-in time.
    pub issued_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Errors raised by session providers.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Email or password did not match.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The provider could not complete the operation.
    #[error("session provider unavailable")]
    Unavailable {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Auth collaborator used by the admin surface.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolve a bearer token to its live session.
    async fn current(&self, token: &str) -> Option<Session>;

    /// Verify credentials and open a session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidCredentials`] on mismatch.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, SessionError>;

    /// End the session behind `token`. Returns whether one was live.
    async fn sign_out(&self, token: &str) -> bool;

    /// End every live session with `reason`, returning how many ended.
    async fn revoke_all(&self, reason: SessionEndReason) -> usize;

    /// Stream of session change notifications.
    fn subscribe(&self) -> EventStream;
}

/// Shared handle to a session provider.
pub type SharedSessionProvider = Arc<dyn SessionProvider>;

/// State of a [`SessionGuard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// Session lookup not finished yet.
    Checking,
    /// A live session was found.
    Authenticated(Session),
    /// No session; the client is sent to `to`.
    Redirecting {
        /// Redirect target.
        to: &'static str,
    },
}

impl GuardState {
    const fn redirect() -> Self {
        Self::Redirecting { to: LOGIN_ROUTE }
    }
}

/// Guard wrapped around admin resources.
pub struct SessionGuard {
    provider: SharedSessionProvider,
    state: GuardState,
}

impl SessionGuard {
    /// New guard in the `Checking` state.
    #[must_use]
    pub const fn new(provider: SharedSessionProvider) -> Self {
        Self {
            provider,
            state: GuardState::Checking,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &GuardState {
        &self.state
    }

    /// Live session, when authenticated.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match &self.state {
            GuardState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    /// Ask the provider for the session behind `token`.
    pub async fn check(&mut self, token: Option<&str>) -> &GuardState {
        let found = match token {
            Some(token) if !token.is_empty() => self.provider.current(token).await,
            _ => None,
        };
        self.state = found.map_or_else(GuardState::redirect, GuardState::Authenticated);
        if matches!(self.state, GuardState::Redirecting { .. }) {
            debug!("no admin session; redirecting to login");
        }
        &self.state
    }

    /// Look the guarded session up again. A session that lapsed in the
    /// meantime moves the guard to redirect.
    pub async fn recheck(&mut self) -> &GuardState {
        let token = self.session().map(|session| session.token.clone());
        self.check(token.as_deref()).await
    }

    /// Apply a session change notification.
    ///
    /// Only the end of the guarded session moves the guard; other sessions
    /// and unrelated events are ignored.
    pub fn observe(&mut self, event: &Event) -> &GuardState {
        if let Event::SessionEnded { session_id, .. } = event
            && self.session().is_some_and(|session| session.id == *session_id)
        {
            self.state = GuardState::redirect();
        }
        &self.state
    }

    /// Follow `stream` until the guarded session ends, then return the
    /// redirect target. Returns `None` if the stream closes first or the
    /// guard is not authenticated.
    pub async fn watch(&mut self, stream: &mut EventStream) -> Option<&'static str> {
        self.session()?;
        while let Some(envelope) = stream.next().await {
            if let GuardState::Redirecting { to } = self.observe(&envelope.event) {
                return Some(*to);
            }
        }
        None
    }
}

/// Application-lifetime owner of the session provider.
pub struct SessionScope {
    provider: SharedSessionProvider,
    events: EventBus,
    closed: AtomicBool,
}

impl SessionScope {
    /// Open the scope at application start.
    #[must_use]
    pub fn new(provider: SharedSessionProvider, events: EventBus) -> Self {
        info!("session scope opened");
        Self {
            provider,
            events,
            closed: AtomicBool::new(false),
        }
    }

    /// Provider owned by this scope.
    #[must_use]
    pub const fn provider(&self) -> &SharedSessionProvider {
        &self.provider
    }

    /// Bus carrying session change notifications.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Fresh guard bound to this scope's provider.
    #[must_use]
    pub fn guard(&self) -> SessionGuard {
        SessionGuard::new(Arc::clone(&self.provider))
    }

    /// Whether [`SessionScope::teardown`] has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Revoke every session and close the scope. Later calls do nothing.
    pub async fn teardown(&self) -> usize {
        if self.closed.swap(true, Ordering::AcqRel) {
            return 0;
        }
        let revoked = self.provider.revoke_all(SessionEndReason::Revoked).await;
        info!(revoked, "session scope closed");
        revoked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FixedProvider {
        events: EventBus,
        sessions: Mutex<Vec<Session>>,
    }

    impl FixedProvider {
        fn new(events: EventBus) -> Arc<Self> {
            Arc::new(Self {
                events,
                sessions: Mutex::new(Vec::new()),
            })
        }

        fn end(&self, session_id: Uuid, reason: SessionEndReason) {
            self.events
                .publish(Event::SessionEnded { session_id, reason });
        }
    }

    #[async_trait]
    impl SessionProvider for FixedProvider {
        async fn current(&self, token: &str) -> Option<Session> {
            self.sessions
                .lock()
                .expect("lock")
                .iter()
                .find(|session| session.token == token)
                .cloned()
        }

        async fn sign_in(&self, email: &str, password: &str) -> Result<Session, SessionError> {
            if password != "secret" {
                return Err(SessionError::InvalidCredentials);
            }
            let now = Utc::now();
            let session = Session {
                id: Uuid::new_v4(),
                email: email.to_string(),
                token: format!("token-{}", Uuid::new_v4()),
                issued_at: now,
                expires_at: now + chrono::Duration::hours(1),
            };
            self.sessions.lock().expect("lock").push(session.clone());
            self.events.publish(Event::SessionStarted {
                session_id: session.id,
            });
            Ok(session)
        }

        async fn sign_out(&self, token: &str) -> bool {
            let removed = {
                let mut sessions = self.sessions.lock().expect("lock");
                let position = sessions.iter().position(|session| session.token == token);
                position.map(|index| sessions.remove(index))
            };
            removed.is_some_and(|session| {
                self.end(session.id, SessionEndReason::SignedOut);
                true
            })
        }

        async fn revoke_all(&self, reason: SessionEndReason) -> usize {
            let drained: Vec<Session> = self.sessions.lock().expect("lock").drain(..).collect();
            for session in &drained {
                self.end(session.id, reason);
            }
            drained.len()
        }

        fn subscribe(&self) -> EventStream {
            self.events.subscribe(None)
        }
    }

    #[tokio::test]
    async fn missing_session_redirects_to_login() {
        let provider = FixedProvider::new(EventBus::new());
        let mut guard = SessionGuard::new(provider);
        assert_eq!(guard.state(), &GuardState::Checking);
        assert_eq!(
            guard.check(None).await,
            &GuardState::Redirecting { to: LOGIN_ROUTE }
        );
        assert_eq!(
            guard.check(Some("stale")).await,
            &GuardState::Redirecting { to: LOGIN_ROUTE }
        );
    }

    #[tokio::test]
    async fn external_sign_out_moves_guard_to_redirect() {
        let events = EventBus::new();
        let provider = FixedProvider::new(events.clone());
        let session = provider
            .sign_in("admin@example.com", "secret")
            .await
            .expect("sign in");
        let other = provider
            .sign_in("admin@example.com", "secret")
            .await
            .expect("second sign in");

        let mut guard = SessionGuard::new(provider.clone());
        assert!(matches!(
            guard.check(Some(&session.token)).await,
            GuardState::Authenticated(_)
        ));

        let mut stream = provider.subscribe();
        provider.sign_out(&other.token).await;
        provider.sign_out(&session.token).await;

        let target = tokio::time::timeout(Duration::from_secs(1), guard.watch(&mut stream))
            .await
            .expect("redirect observed");
        assert_eq!(target, Some(LOGIN_ROUTE));
    }

    #[tokio::test]
    async fn teardown_revokes_once() {
        let events = EventBus::new();
        let provider = FixedProvider::new(events.clone());
        provider
            .sign_in("admin@example.com", "secret")
            .await
            .expect("sign in");
        let scope = SessionScope::new(provider, events);
        let mut stream = scope.events().subscribe(None);

        assert_eq!(scope.teardown().await, 1);
        assert!(scope.is_closed());
        assert_eq!(scope.teardown().await, 0);

        let envelope = stream.next().await.expect("notification");
        assert!(matches!(
            envelope.event,
            Event::SessionEnded {
                reason: SessionEndReason::Revoked,
                ..
            }
        ));
    }

    #[test]
    fn debug_output_hides_token() {
        let now = Utc::now();
        let session = Session {
            id: Uuid::nil(),
            email: "a@b.c".into(),
            token: "super-secret".into(),
            issued_at: now,
            expires_at: now,
        };
        assert!(!format!("{session:?}").contains("super-secret"));
        assert!(session.is_expired(now));
    }
}
