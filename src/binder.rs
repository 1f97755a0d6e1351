//! Registers generated routes on an axum router.

use crate::routing::{Method, Route, RouteRequest};
use axum::body::Bytes;
use axum::extract::Path;
use axum::http::{HeaderMap, Uri};
use axum::routing::on;
use axum::Router;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

fn placeholder_regex() -> Option<&'static Regex> {
    static PLACEHOLDER: OnceLock<Option<Regex>> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^}]+)\}").ok()).as_ref()
}

/// `/users/{id}` -> `/users/:id`. Paths without placeholders pass through unchanged.
pub fn router_path(path: &str) -> String {
    match placeholder_regex() {
        Some(re) => re.replace_all(path, ":$1").into_owned(),
        None => path.to_string(),
    }
}

/// Router serving every route at its unprefixed path.
///
/// A second route with an already bound path and method is skipped.
pub fn bind(routes: &[Route]) -> Router {
    let mut seen: HashSet<(String, Method)> = HashSet::new();
    let mut router = Router::new();
    for route in routes {
        let path = router_path(route.path());
        if !seen.insert((path.clone(), route.method())) {
            tracing::warn!(method = %route.method(), path = %path, "duplicate route skipped");
            continue;
        }
        tracing::debug!(method = %route.method(), path = %path, "route bound");
        let route = route.clone();
        let method_router = on(
            route.method().method_filter(),
            move |method: axum::http::Method,
                  uri: Uri,
                  headers: HeaderMap,
                  params: Option<Path<HashMap<String, String>>>,
                  body: Bytes| {
                let route = route.clone();
                async move {
                    let req = RouteRequest {
                        method,
                        uri,
                        headers,
                        params: params.map(|Path(p)| p).unwrap_or_default(),
                        body,
                    };
                    route.call(req).await
                }
            },
        );
        router = router.route(&path, method_router);
    }
    router
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_placeholders() {
        assert_eq!(router_path("/users/{id}"), "/users/:id");
        assert_eq!(router_path("/a/{x}/b/{y}"), "/a/:x/b/:y");
        assert_eq!(router_path("/users"), "/users");
    }
}
