//! Credential-backed session registry.
//!
//! # Design
//! - One admin account comes from configuration; the password is checked
//!   against its argon2 hash on a blocking thread.
//! - Sessions live in memory keyed by an opaque random bearer token and
//!   expire after the configured lifetime. Every lookup and sign-in sweeps
//!   lapsed sessions out and reports each one as expired.
//! - Every start and end is published on the event bus so open admin pages
//!   can follow it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use folio_config::{AdminCredentials, verify_secret};
use folio_core::session::{Session, SessionError, SessionProvider};
use folio_events::{Event, EventBus, EventStream, SessionEndReason};
use folio_telemetry::Metrics;
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::{info, warn};
use uuid::Uuid;

const TOKEN_LENGTH: usize = 48;

/// In-memory [`SessionProvider`] for the single configured admin.
pub struct SessionRegistry {
    admin: Option<AdminCredentials>,
    ttl: TimeDelta,
    sessions: Mutex<HashMap<String, Session>>,
    events: EventBus,
    telemetry: Metrics,
}

impl SessionRegistry {
    /// Registry accepting `admin` (or nobody, when `None`), issuing sessions
    /// that last `ttl`.
    #[must_use]
    pub fn new(
        admin: Option<AdminCredentials>,
        ttl: Duration,
        events: EventBus,
        telemetry: Metrics,
    ) -> Self {
        if admin.is_none() {
            warn!("no admin credentials configured; HQ sign-in is disabled");
        }
        Self {
            admin,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            sessions: Mutex::new(HashMap::new()),
            events,
            telemetry,
        }
    }

    /// Number of sessions currently held. Lapsed sessions count until the
    /// next sweep.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no session is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn end_all(&self, ended: &[Session], reason: SessionEndReason, remaining: usize) {
        for session in ended {
            self.end(session, reason, remaining);
        }
    }

    fn end(&self, session: &Session, reason: SessionEndReason, remaining: usize) {
        self.telemetry.set_active_sessions(remaining);
        self.events.publish(Event::SessionEnded {
            session_id: session.id,
            reason,
        });
        info!(session_id = %session.id, reason = ?reason, "admin session ended");
    }

    async fn verify(&self, email: &str, password: &str) -> Result<String, SessionError> {
        let Some(admin) = self.admin.as_ref() else {
            return Err(SessionError::InvalidCredentials);
        };
        if !admin.email.eq_ignore_ascii_case(email.trim()) {
            return Err(SessionError::InvalidCredentials);
        }

        let hash = admin.password_hash.clone();
        let candidate = password.to_string();
        let matched = tokio::task::spawn_blocking(move || verify_secret(&hash, &candidate))
            .await
            .map_err(|source| SessionError::Unavailable {
                operation: "sign_in.join",
                source: Box::new(source),
            })?
            .map_err(|source| SessionError::Unavailable {
                operation: "sign_in.verify",
                source: Box::new(source),
            })?;
        if matched {
            Ok(admin.email.clone())
        } else {
            Err(SessionError::InvalidCredentials)
        }
    }
}

fn take_expired(sessions: &mut HashMap<String, Session>, now: DateTime<Utc>) -> Vec<Session> {
    let mut expired = Vec::new();
    sessions.retain(|_, session| {
        if session.is_expired(now) {
            expired.push(session.clone());
            false
        } else {
            true
        }
    });
    expired
}

fn issue_token() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[async_trait]
impl SessionProvider for SessionRegistry {
    async fn current(&self, token: &str) -> Option<Session> {
        let (found, expired, remaining) = {
            let mut sessions = self.lock();
            let expired = take_expired(&mut sessions, Utc::now());
            (sessions.get(token).cloned(), expired, sessions.len())
        };
        self.end_all(&expired, SessionEndReason::Expired, remaining);
        found
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let email = match self.verify(email, password).await {
            Ok(email) => email,
            Err(err) => {
                warn!(error = %err, "admin sign-in rejected");
                return Err(err);
            }
        };

        let issued_at = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            email,
            token: issue_token(),
            issued_at,
            expires_at: issued_at
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        let (expired, active) = {
            let mut sessions = self.lock();
            let expired = take_expired(&mut sessions, issued_at);
            sessions.insert(session.token.clone(), session.clone());
            (expired, sessions.len())
        };
        self.end_all(&expired, SessionEndReason::Expired, active);
        self.telemetry.set_active_sessions(active);
        self.events.publish(Event::SessionStarted {
            session_id: session.id,
        });
        info!(session_id = %session.id, "admin session started");
        Ok(session)
    }

    async fn sign_out(&self, token: &str) -> bool {
        let (removed, remaining) = {
            let mut sessions = self.lock();
            let removed = sessions.remove(token);
            (removed, sessions.len())
        };
        match removed {
            Some(session) => {
                self.end(&session, SessionEndReason::SignedOut, remaining);
                true
            }
            None => false,
        }
    }

    async fn revoke_all(&self, reason: SessionEndReason) -> usize {
        let drained: Vec<Session> = self.lock().drain().map(|(_, session)| session).collect();
        for session in &drained {
            self.end(session, reason, 0);
        }
        drained.len()
    }

    fn subscribe(&self) -> EventStream {
        self.events.subscribe(None)
    }
}
