/// Folio: personal portfolio site with a login-gated admin area
///
/// This library provides the site's document store (projects and a singleton
/// profile), an email/password identity provider, the route table with its
/// session guard, and the HTTP layer serving all of it.

// Core configuration and setup
pub mod config;

// Document store - project collection, profile document, realtime subscriptions
pub mod store;

// Identity provider and reactive session state
pub mod auth;

// Route table and navigation guard
pub mod router;

// HTTP API layer - page views, REST endpoints and the project stream
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use auth::{IdentityProvider, SessionObserver, User};
pub use store::{Profile, Project};
pub use server::{create_app, start_server};
