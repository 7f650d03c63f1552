/// Sign-in and sign-out endpoints
///
/// The session token is returned in the body and also set as an HttpOnly cookie
/// so page navigations carry it.

use crate::api::{error_status, request_user, session_token, AppState, SESSION_COOKIE};
use crate::auth::User;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// User behind the request's session token
    pub user: Option<User>,
    /// Whether anyone is signed in to the site
    pub signed_in: bool,
}

pub fn create_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/session", get(session))
}

/// POST /api/auth/login
/// Body: { "email": "...", "password": "..." }
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let session = state
        .identity
        .login(&payload.email, &payload.password)
        .await
        .map_err(|e| error_status(&e))?;

    let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, session.token);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            token: session.token,
            user: session.user,
        }),
    ))
}

/// POST /api/auth/logout
///
/// Always succeeds; sign-out failures are only logged.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session_token(&headers) {
        state.identity.logout(&token).await;
    }

    let cookie = format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", SESSION_COOKIE);
    ([(header::SET_COOKIE, cookie)], StatusCode::NO_CONTENT)
}

/// GET /api/auth/session
async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, StatusCode> {
    Ok(Json(SessionResponse {
        user: request_user(&state, &headers).await?,
        signed_in: state.observer.is_signed_in(),
    }))
}
