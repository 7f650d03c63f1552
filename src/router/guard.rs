/// Navigation guard
///
/// One rule: entering a route that requires a session awaits the one-shot
/// session accessor; no user means a redirect to the login page. The decision
/// is made fresh on every navigation.

use crate::auth::User;
use crate::router::routes::{resolve, RouteMatch, LOGIN_PATH};
use std::future::Future;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Enter the target; `user` is set when the session was checked
    Proceed { target: RouteMatch, user: Option<User> },
    Redirect { to: &'static str },
}

/// Decide whether `target` may be entered
///
/// `session` is only awaited for routes that require one. A failed session
/// lookup is returned as is; it is not treated as a missing session.
pub async fn guard<F, Fut, E>(target: RouteMatch, session: F) -> Result<Navigation, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<User>, E>>,
{
    if !target.route.requires_auth {
        return Ok(Navigation::Proceed { target, user: None });
    }

    match session().await? {
        Some(user) => Ok(Navigation::Proceed { target, user: Some(user) }),
        None => {
            tracing::info!("🚧 No session for {}, redirecting to {}", target.route.path, LOGIN_PATH);
            Ok(Navigation::Redirect { to: LOGIN_PATH })
        }
    }
}

/// Resolve `path` and run the guard; `Ok(None)` when no route matches
pub async fn navigate<F, Fut, E>(path: &str, session: F) -> Result<Option<Navigation>, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<User>, E>>,
{
    match resolve(path) {
        Some(target) => guard(target, session).await.map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::routes::RouteName;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn admin() -> User {
        User {
            uid: "u1".to_string(),
            email: "admin@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_admin_without_session_redirects() {
        let nav = navigate("/admin", || async { Ok::<_, ()>(None) }).await.unwrap().unwrap();
        assert_eq!(nav, Navigation::Redirect { to: "/login" });
    }

    #[tokio::test]
    async fn test_admin_with_session_proceeds() {
        let nav = navigate("/admin", || async { Ok::<_, ()>(Some(admin())) }).await.unwrap().unwrap();
        match nav {
            Navigation::Proceed { target, user } => {
                assert_eq!(target.name(), RouteName::Admin);
                assert_eq!(user, Some(admin()));
            }
            other => panic!("unexpected navigation: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_public_routes_skip_session_check() {
        let calls = AtomicUsize::new(0);
        let nav = navigate("/projects", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(None)
        })
        .await
        .unwrap()
        .unwrap();

        assert!(matches!(nav, Navigation::Proceed { user: None, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let nav = navigate("/missing", || async { Ok::<_, ()>(Some(admin())) }).await;
        assert_eq!(nav, Ok(None));
    }

    #[tokio::test]
    async fn test_session_failure_is_not_a_redirect() {
        let nav = navigate("/admin", || async { Err::<Option<User>, _>("lookup failed") }).await;
        assert_eq!(nav, Err("lookup failed"));

        // Public routes never run the lookup, so they still proceed
        let nav = navigate("/about", || async { Err::<Option<User>, _>("lookup failed") }).await;
        assert!(matches!(nav, Ok(Some(Navigation::Proceed { user: None, .. }))));
    }
}
