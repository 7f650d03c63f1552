/// Profile endpoints
///
/// GET always answers: before the first write it returns the default profile.

use crate::{
    api::{error_status, require_user, AppState},
    store::{Profile, ProfileUpdate},
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::get,
    Router,
};

pub fn create_profile_routes() -> Router<AppState> {
    Router::new().route("/api/profile", get(get_profile).put(update_profile))
}

/// GET /api/profile
async fn get_profile(State(state): State<AppState>) -> Result<Json<Profile>, StatusCode> {
    match state.profile.profile_or_default().await {
        Ok(profile) => Ok(Json(profile)),
        Err(e) => {
            tracing::error!("Failed to load profile: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// PUT /api/profile
/// Body: any subset of the profile fields, merged into the stored document
async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, StatusCode> {
    require_user(&state, &headers).await?;

    state
        .profile
        .update_profile(update)
        .await
        .map(Json)
        .map_err(|e| error_status(&e))
}
