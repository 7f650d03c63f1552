/// Document store layer
///
/// SQLite-backed project collection and singleton profile document, plus the
/// change feed that drives realtime snapshot subscriptions.

// Connection pool and schema
pub mod database;

// Record shapes and well-known collection/document keys
pub mod types;

// Store failures callers need to distinguish
pub mod error;

// Write notifications
pub mod changes;

// Project collection CRUD
pub mod projects;

// Singleton profile document
pub mod profile;

// Realtime subscriptions over the change feed
pub mod live;

pub use changes::{Change, ChangeFeed, ChangeKind};
pub use database::DatabaseManager;
pub use error::StoreError;
pub use live::{watch_profile, watch_projects, LiveQuery};
pub use profile::ProfileStore;
pub use projects::ProjectStore;
pub use types::{NewProject, Profile, ProfileUpdate, Project, ProjectUpdate};
