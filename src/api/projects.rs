/// Project REST API endpoints
///
/// Reads are public; writes need a session. Every write lands on the change
/// feed, so open `/api/projects/stream` connections see it immediately.

use crate::{
    api::{error_status, require_user, AppState},
    store::{watch_projects, NewProject, Project, ProjectUpdate},
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
    routing::get,
    Router,
};
use futures_util::stream::{self, Stream};
use serde::Serialize;
use serde_json::{json, Value};
use std::convert::Infallible;

/// Response for project creation/update operations
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: String,
    pub message: String,
}

/// Create project routes
pub fn create_project_routes() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route("/api/projects/stream", get(stream_projects))
        .route(
            "/api/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
}

/// Create a new project
///
/// POST /api/projects
/// Body: { "title": "...", "description": "...", "category": "...", "tags": [...], "image": "...", "link": "..." }
async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(project): Json<NewProject>,
) -> Result<(StatusCode, Json<ProjectResponse>), StatusCode> {
    require_user(&state, &headers).await?;

    if project.title.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let title = project.title.clone();
    let id = state
        .projects
        .add_project(project)
        .await
        .map_err(|e| error_status(&e))?;

    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            id,
            message: format!("Project '{}' created successfully", title),
        }),
    ))
}

/// List all projects, newest first
///
/// GET /api/projects
/// Returns: { "projects": [...] }
async fn list_projects(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    match state.projects.list_projects().await {
        Ok(projects) => Ok(Json(json!({ "projects": projects }))),
        Err(e) => {
            tracing::error!("Failed to list projects: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific project by ID
///
/// GET /api/projects/{id}
async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, StatusCode> {
    match state.projects.get_project(&id).await {
        Ok(Some(project)) => Ok(Json(project)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get project {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Merge fields into an existing project
///
/// PUT /api/projects/{id}
/// Body: any subset of the project fields
async fn update_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(updates): Json<ProjectUpdate>,
) -> Result<Json<Project>, StatusCode> {
    require_user(&state, &headers).await?;

    if updates.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(StatusCode::BAD_REQUEST);
    }

    state
        .projects
        .update_project(&id, updates)
        .await
        .map(Json)
        .map_err(|e| error_status(&e))
}

/// Delete a project
///
/// DELETE /api/projects/{id}
/// Returns: { "message": "Project deleted successfully" }
async fn delete_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    require_user(&state, &headers).await?;

    match state.projects.delete_project(&id).await {
        Ok(true) => Ok(Json(json!({ "message": "Project deleted successfully" }))),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(error_status(&e)),
    }
}

/// Realtime project list
///
/// GET /api/projects/stream
/// Sends the full ordered list on connect and again after every change.
/// The subscription ends when the client disconnects.
async fn stream_projects(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let live = watch_projects(&state.projects).await;
    tracing::debug!("📡 Project stream opened");

    let events = stream::unfold((live, true), |(mut live, first)| async move {
        let snapshot = if first {
            live.current()
        } else {
            live.changed().await?
        };

        let event = match Event::default().event("projects").json_data(&snapshot) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("Failed to encode project snapshot: {}", e);
                Event::default().event("error").data(e.to_string())
            }
        };
        Some((Ok(event), (live, false)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
