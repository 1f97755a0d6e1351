//! Serves the assembled API document.

use axum::{routing::get, Json, Router};
use std::sync::Arc;
use utoipa::openapi::OpenApi;

pub const DOCS_PATH: &str = "/openapi.json";

/// GET /openapi.json returning `doc`.
pub fn docs_routes(doc: OpenApi) -> Router {
    let doc = Arc::new(doc);
    Router::new().route(
        DOCS_PATH,
        get(move || {
            let doc = doc.clone();
            async move { Json(doc.as_ref().clone()) }
        }),
    )
}
