/// HTTP API Layer
///
/// This module provides the HTTP surface of the site:
/// - Page routes rendered as JSON views, guarded by the router
/// - Project and profile REST endpoints for the admin area
/// - Sign-in/sign-out endpoints
/// - Server-sent events for realtime project snapshots

use crate::{
    auth::{AuthError, IdentityProvider, SessionObserver, User},
    store::{ProfileStore, ProjectStore, StoreError},
};
use axum::http::{header, HeaderMap, StatusCode};
use std::sync::Arc;

// Sign-in, sign-out and session lookup
pub mod auth;

// Project CRUD and realtime stream
pub mod projects;

// Singleton profile document
pub mod profile;

// Route-table-driven page views
pub mod pages;

pub use auth::create_auth_routes;
pub use pages::create_page_routes;
pub use profile::create_profile_routes;
pub use projects::create_project_routes;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Project collection
    pub projects: ProjectStore,
    /// Singleton profile document
    pub profile: ProfileStore,
    /// Credential exchange and session lookup
    pub identity: IdentityProvider,
    /// Process-wide reactive auth state
    pub observer: Arc<SessionObserver>,
}

/// Session token from `Authorization: Bearer` or the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// One-shot session accessor for a single request
///
/// No token means no user; a failed lookup is logged and answered with a 500.
pub async fn request_user(state: &AppState, headers: &HeaderMap) -> Result<Option<User>, StatusCode> {
    let Some(token) = session_token(headers) else {
        return Ok(None);
    };
    state.identity.session(&token).await.map_err(|e| {
        tracing::error!("❌ Session lookup failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Like `request_user`, but a missing session is a 401
pub async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User, StatusCode> {
    request_user(state, headers).await?.ok_or(StatusCode::UNAUTHORIZED)
}

/// Map a service error to a response status
pub fn error_status(e: &anyhow::Error) -> StatusCode {
    if let Some(StoreError::NotFound { .. }) = e.downcast_ref::<StoreError>() {
        return StatusCode::NOT_FOUND;
    }
    if let Some(AuthError::InvalidCredentials) = e.downcast_ref::<AuthError>() {
        return StatusCode::UNAUTHORIZED;
    }
    StatusCode::INTERNAL_SERVER_ERROR
}
