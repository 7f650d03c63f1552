/// Folio: personal portfolio site
///
/// Main entry point for the folio server. Loads configuration from the
/// environment and starts the HTTP server.

use folio::{config::Config, server::start_server};

/// Application entry point
///
/// The server provides:
/// - Site pages at /, /about, /projects, /project/{id}, /resume, /login, /admin
/// - Admin API at /api/projects/*, /api/profile and /api/auth/*
/// - Health check at /healthz
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (defaults to 0.0.0.0:3005 and data/folio.db)
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
