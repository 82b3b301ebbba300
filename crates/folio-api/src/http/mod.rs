//! HTTP surface modules (router, middleware, handlers).

/// Admin (HQ) handlers behind the session guard.
pub mod admin;
/// Session guard middleware and login/logout handlers.
pub mod auth;
/// Shared constants and header names.
pub mod constants;
/// Problem response helpers and error types.
pub mod errors;
/// Health and diagnostics endpoints.
pub mod health;
/// Public site handlers.
pub mod public;
/// Router construction and server host.
pub mod router;
/// Session change stream for open admin pages.
pub mod sse;
/// Metrics middleware for HTTP requests.
pub mod telemetry;
