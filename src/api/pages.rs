/// Page views driven by the route table
///
/// Every entry of `ROUTES` is mounted on the same handler. The handler resolves
/// the request path, runs the navigation guard with the request's one-shot
/// session accessor and renders the view as JSON.

use crate::{
    api::{request_user, AppState},
    auth::User,
    router::{navigate, scroll_behavior, Navigation, RouteMatch, RouteName, Scroll, ROUTES},
    store::{Profile, Project},
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::collections::HashMap;

/// Rendered page
#[derive(Debug, Serialize)]
pub struct Page {
    pub route: RouteName,
    pub params: HashMap<String, String>,
    pub scroll: Scroll,
    #[serde(flatten)]
    pub view: View,
}

#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum View {
    Home { profile: Profile, projects: Vec<Project> },
    About { profile: Profile },
    Projects { projects: Vec<Project> },
    ProjectDetail { project: Project },
    #[serde(rename_all = "camelCase")]
    Resume { resume_link: String },
    Login { user: Option<User> },
    Admin { user: User, profile: Profile, projects: Vec<Project> },
}

/// Mount every route of the table, with and without a trailing slash
pub fn create_page_routes() -> Router<AppState> {
    ROUTES.iter().fold(Router::new(), |router, route| {
        let path = axum_path(route.path);
        let router = router.route(&path, get(render_page));
        if path == "/" {
            router
        } else {
            router.route(&format!("{}/", path), get(render_page))
        }
    })
}

/// Convert `:param` segments to axum's `{param}` syntax
fn axum_path(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{}}}", name),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

async fn render_page(State(state): State<AppState>, headers: HeaderMap, uri: Uri) -> Response {
    let path = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
    tracing::debug!("🧭 Navigating to {}", path);

    let navigation = navigate(path, || request_user(&state, &headers)).await;

    match navigation {
        Err(status) => status.into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Ok(Some(Navigation::Redirect { to })) => Redirect::to(to).into_response(),
        Ok(Some(Navigation::Proceed { target, user })) => match render_view(&state, &headers, &target, user).await {
            Ok(view) => Json(Page {
                route: target.name(),
                scroll: scroll_behavior(&target),
                params: target.params,
                view,
            })
            .into_response(),
            Err(status) => status.into_response(),
        },
    }
}

async fn render_view(
    state: &AppState,
    headers: &HeaderMap,
    target: &RouteMatch,
    user: Option<User>,
) -> Result<View, StatusCode> {
    let view = match target.name() {
        RouteName::Home => View::Home {
            profile: load_profile(state).await?,
            projects: load_projects(state).await?,
        },
        RouteName::About => View::About {
            profile: load_profile(state).await?,
        },
        RouteName::Projects => View::Projects {
            projects: load_projects(state).await?,
        },
        RouteName::ProjectDetail => {
            let id = target.param("id").ok_or(StatusCode::NOT_FOUND)?;
            match state.projects.get_project(id).await {
                Ok(Some(project)) => View::ProjectDetail { project },
                Ok(None) => return Err(StatusCode::NOT_FOUND),
                Err(e) => {
                    tracing::error!("Failed to get project {}: {}", id, e);
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
            }
        }
        RouteName::Resume => View::Resume {
            resume_link: load_profile(state).await?.resume_link,
        },
        RouteName::Login => View::Login {
            user: request_user(state, headers).await?,
        },
        RouteName::Admin => View::Admin {
            // The guard only lets signed-in users through
            user: user.ok_or(StatusCode::UNAUTHORIZED)?,
            profile: load_profile(state).await?,
            projects: load_projects(state).await?,
        },
    };
    Ok(view)
}

async fn load_profile(state: &AppState) -> Result<Profile, StatusCode> {
    state.profile.profile_or_default().await.map_err(|e| {
        tracing::error!("Failed to load profile: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

async fn load_projects(state: &AppState) -> Result<Vec<Project>, StatusCode> {
    state.projects.list_projects().await.map_err(|e| {
        tracing::error!("Failed to list projects: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
