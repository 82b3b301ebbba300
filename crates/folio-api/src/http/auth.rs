//! Session guard middleware plus the sign-in and sign-out handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    body::Body,
    extract::State,
    http::{
        HeaderMap, HeaderValue, Request,
        header::{AUTHORIZATION, COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use folio_core::session::{GuardState, LOGIN_ROUTE, Session};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::http::constants::SESSION_COOKIE;
use crate::http::errors::ApiError;
use crate::state::ApiState;

/// Route an authenticated sign-in lands on.
pub(crate) const HQ_HOME: &str = "/admin";

/// Bearer token from `Authorization: Bearer` or the session cookie.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

fn session_cookie(token: &str, max_age_secs: i64) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={token}; Path={HQ_HOME}; HttpOnly; SameSite=Strict; Max-Age={max_age_secs}"
    ))
    .ok()
}

/// Run the session guard before any admin handler.
///
/// A missing or dead session is answered with `303 See Other` to the login
/// route and no body; the handler never runs.
pub(crate) async fn require_session(
    State(state): State<Arc<ApiState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = session_token(req.headers());
    let mut guard = state.sessions.guard();
    match guard.check(token.as_deref()).await {
        GuardState::Authenticated(session) => {
            req.extensions_mut().insert(session.clone());
            next.run(req).await
        }
        GuardState::Redirecting { to } => {
            debug!(path = %req.uri().path(), "admin request without session");
            Redirect::to(to).into_response()
        }
        GuardState::Checking => Redirect::to(LOGIN_ROUTE).into_response(),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginPage {
    pub(crate) authenticated: bool,
    pub(crate) redirect_to: Option<&'static str>,
}

/// The login page model. Already signed-in visitors are pointed at HQ.
pub(crate) async fn login_page(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Json<LoginPage> {
    let mut guard = state.sessions.guard();
    let authenticated = matches!(
        guard.check(session_token(&headers).as_deref()).await,
        GuardState::Authenticated(_)
    );
    Json(LoginPage {
        authenticated,
        redirect_to: authenticated.then_some(HQ_HOME),
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginResponse {
    pub(crate) session: Session,
    pub(crate) token: String,
    pub(crate) redirect_to: &'static str,
}

pub(crate) async fn login(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::unauthorized("email and password are required"));
    }
    let session = state
        .sessions
        .provider()
        .sign_in(&request.email, &request.password)
        .await?;

    let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
    let cookie = session_cookie(&session.token, max_age)
        .ok_or_else(|| ApiError::internal("failed to build session cookie"))?;
    let token = session.token.clone();
    let mut response = Json(LoginResponse {
        session,
        token,
        redirect_to: HQ_HOME,
    })
    .into_response();
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(response)
}

pub(crate) async fn logout(
    State(state): State<Arc<ApiState>>,
    Extension(session): Extension<Session>,
) -> Response {
    let ended = state.sessions.provider().sign_out(&session.token).await;
    info!(session_id = %session.id, ended, "admin signed out");
    let mut response = Redirect::to(LOGIN_ROUTE).into_response();
    if let Some(cookie) = session_cookie("", 0) {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    response
}
