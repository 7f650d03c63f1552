/// Static route table
///
/// Maps site paths to named views. `:param` segments capture one non-empty
/// path segment each.

use serde::Serialize;
use std::collections::HashMap;

/// Where the guard sends visitors without a session
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteName {
    Home,
    About,
    Projects,
    ProjectDetail,
    Resume,
    Login,
    Admin,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: RouteName,
    /// Entering this route needs a signed-in user
    pub requires_auth: bool,
}

pub static ROUTES: &[Route] = &[
    Route { path: "/", name: RouteName::Home, requires_auth: false },
    Route { path: "/about", name: RouteName::About, requires_auth: false },
    Route { path: "/projects", name: RouteName::Projects, requires_auth: false },
    Route { path: "/project/:id", name: RouteName::ProjectDetail, requires_auth: false },
    Route { path: "/resume", name: RouteName::Resume, requires_auth: false },
    Route { path: LOGIN_PATH, name: RouteName::Login, requires_auth: false },
    Route { path: "/admin", name: RouteName::Admin, requires_auth: true },
];

/// A concrete path matched against the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: &'static Route,
    pub params: HashMap<String, String>,
    /// Fragment without the leading '#'
    pub hash: Option<String>,
}

impl RouteMatch {
    pub fn name(&self) -> RouteName {
        self.route.name
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Post-navigation scroll position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "to", rename_all = "lowercase")]
pub enum Scroll {
    /// Scroll to the element with this selector (e.g. "#contact")
    Element { selector: String, smooth: bool },
    Top { smooth: bool },
}

/// Resolve a path (query string and fragment allowed) to a route
pub fn resolve(path: &str) -> Option<RouteMatch> {
    let (path, hash) = match path.split_once('#') {
        Some((path, hash)) => (path, Some(hash.to_string()).filter(|h| !h.is_empty())),
        None => (path, None),
    };
    let path = path.split_once('?').map_or(path, |(path, _)| path);

    if !path.starts_with('/') {
        return None;
    }
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    ROUTES.iter().find_map(|route| {
        match_segments(route.path, &segments).map(|params| RouteMatch {
            route,
            params,
            hash: hash.clone(),
        })
    })
}

fn match_segments(pattern: &str, segments: &[&str]) -> Option<HashMap<String, String>> {
    let pattern: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    if pattern.len() != segments.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (expected, actual) in pattern.iter().zip(segments) {
        match expected.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), actual.to_string());
            }
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}

/// Scroll to the target's fragment if it has one, otherwise to the top
pub fn scroll_behavior(target: &RouteMatch) -> Scroll {
    match &target.hash {
        Some(hash) => Scroll::Element {
            selector: format!("#{}", hash),
            smooth: true,
        },
        None => Scroll::Top { smooth: true },
    }
}
