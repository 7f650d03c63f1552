/// Reactive view of the auth state
///
/// `SessionObserver` keeps the current user in an `ArcSwapOption`, written only
/// by the single subscription it creates and read lock-free by everyone else.
/// `current_user_once` resolves the state from the first notification and then
/// stops listening.

use crate::auth::{provider::IdentityProvider, types::User};
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct SessionObserver {
    current: Arc<ArcSwapOption<User>>,
    task: JoinHandle<()>,
}

impl SessionObserver {
    /// Start observing the provider's auth state
    pub fn spawn(provider: &IdentityProvider) -> Self {
        let mut rx = provider.on_auth_state_changed();
        let current = Arc::new(ArcSwapOption::new(rx.borrow_and_update().clone().map(Arc::new)));

        let writer = Arc::clone(&current);
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let user = rx.borrow_and_update().clone();
                match &user {
                    Some(user) => tracing::debug!("🔐 Auth state: signed in as {}", user.email),
                    None => tracing::debug!("🔓 Auth state: signed out"),
                }
                writer.store(user.map(Arc::new));
            }
        });

        Self { current, task }
    }

    /// Current user, if signed in
    pub fn current(&self) -> Option<User> {
        self.current.load_full().map(|user| (*user).clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.load().is_some()
    }
}

impl Drop for SessionObserver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// One-shot accessor for the auth state
///
/// Subscribes, takes the first value and drops the subscription.
pub async fn current_user_once(provider: &IdentityProvider) -> Option<User> {
    let rx = provider.on_auth_state_changed();
    let user = rx.borrow().clone();
    drop(rx);
    user
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DatabaseManager;
    use std::time::Duration;

    async fn wait_for(observer: &SessionObserver, signed_in: bool) -> bool {
        for _ in 0..500 {
            if observer.is_signed_in() == signed_in {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_observer_follows_sign_in_and_out() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let provider = IdentityProvider::connect(db.pool().clone()).await.unwrap();
        provider.ensure_user("admin@example.com", "hunter22").await.unwrap();

        let observer = SessionObserver::spawn(&provider);
        assert!(observer.current().is_none());
        assert!(current_user_once(&provider).await.is_none());

        let session = provider.login("admin@example.com", "hunter22").await.unwrap();
        assert!(wait_for(&observer, true).await);
        assert_eq!(observer.current().unwrap().email, "admin@example.com");
        assert_eq!(current_user_once(&provider).await, Some(session.user));

        provider.logout(&session.token).await;
        assert!(wait_for(&observer, false).await);
        assert!(current_user_once(&provider).await.is_none());
    }
}
