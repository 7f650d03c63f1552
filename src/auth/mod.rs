/// Authentication layer
///
/// Email/password identity provider, session tokens and the reactive
/// current-user value that the rest of the app observes.

// User, Session and credential errors
pub mod types;

// Argon2 password hashing and session token helpers
pub mod password;

// Credential exchange, sessions and auth state notifications
pub mod provider;

// Reactive current-user value and one-shot accessor
pub mod observer;

pub use observer::{current_user_once, SessionObserver};
pub use provider::IdentityProvider;
pub use types::{AuthError, Session, User};
