mod common;
mod docs;

pub use common::common_routes;
pub use docs::{docs_routes, DOCS_PATH};

use crate::binder;
use crate::routing::Route;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::openapi::OpenApi;

/// Upper bound on request bodies accepted by [`app`].
pub const BODY_LIMIT: usize = 1024 * 1024;

/// Full application router: common routes at the root, and the bound CRUD routes plus
/// the document mounted under `prefix` (at the root when `prefix` is empty).
pub fn app(routes: &[Route], doc: OpenApi, prefix: &str) -> Router {
    let api = binder::bind(routes).merge(docs_routes(doc));
    let prefix = prefix.trim_end_matches('/');
    let mounted = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    };
    Router::new()
        .merge(common_routes())
        .merge(mounted)
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(BODY_LIMIT)))
}
