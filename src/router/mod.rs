/// Client-facing route table and navigation guard

// Path table, matching and scroll behaviour
pub mod routes;

// Session guard for protected routes
pub mod guard;

pub use guard::{guard, navigate, Navigation};
pub use routes::{resolve, scroll_behavior, Route, RouteMatch, RouteName, Scroll, LOGIN_PATH, ROUTES};
