/// Server setup and initialization
///
/// Wires together all components: database, stores, identity provider, session
/// observer and HTTP routes. Provides the main application factory function for
/// creating the Axum app.

use crate::{
    api::{
        create_auth_routes, create_page_routes, create_profile_routes, create_project_routes,
        AppState,
    },
    auth::{IdentityProvider, SessionObserver},
    config::Config,
    store::{ChangeFeed, DatabaseManager, ProfileStore, ProjectStore},
};
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Build the shared application state
///
/// Opens the database, provisions the admin account when configured and starts
/// the session observer.
pub async fn create_state(config: &Config) -> Result<AppState> {
    tracing::info!("🗄️ Initializing document store");
    let database = DatabaseManager::connect(&config.database)
        .await
        .context("Failed to open database")?;

    let changes = ChangeFeed::new();
    let projects = ProjectStore::new(database.pool().clone(), changes.clone());
    let profile = ProfileStore::new(database.pool().clone(), changes);

    tracing::info!("🔐 Initializing identity provider");
    let identity = IdentityProvider::connect_with_ttl(database.pool().clone(), config.auth.session_ttl())
        .await
        .context("Failed to initialize identity provider")?;

    match (&config.auth.admin_email, &config.auth.admin_password) {
        (Some(email), Some(password)) => {
            identity
                .ensure_user(email, password)
                .await
                .context("Failed to provision admin account")?;
        }
        _ => tracing::warn!("⚠️ No admin credentials configured; the admin area will be unreachable"),
    }

    let observer = Arc::new(SessionObserver::spawn(&identity));

    Ok(AppState {
        projects,
        profile,
        identity,
        observer,
    })
}

/// Create the main Axum application with all routes
pub async fn create_app(config: Config) -> Result<Router> {
    let state = create_state(&config).await?;

    tracing::info!("📡 Creating HTTP router with all endpoints");
    let app = Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Site pages from the route table
        .merge(create_page_routes())
        // Admin and data API
        .merge(create_auth_routes())
        .merge(create_project_routes())
        .merge(create_profile_routes())
        .with_state(state);

    tracing::info!("✅ Application initialized successfully");

    Ok(app)
}

/// Start the HTTP server with the given configuration
///
/// Creates the application and starts the Axum server on the configured address and port.
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting folio server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
