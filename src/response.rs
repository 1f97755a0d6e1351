//! Standard response envelope helpers.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::{Deserialize, Serialize};

/// Literal body of successful create, update and delete responses.
pub const OK_TEXT: &str = "OK";

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemBody<T> {
    pub item: T,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemsBody<T> {
    pub items: Vec<T>,
}

/// 200 with `{item: ...}`.
pub fn success_item<T: Serialize>(item: T) -> Response {
    (StatusCode::OK, Json(ItemBody { item })).into_response()
}

/// 200 with `{items: [...]}`.
pub fn success_items<T: Serialize>(items: Vec<T>) -> Response {
    (StatusCode::OK, Json(ItemsBody { items })).into_response()
}

/// 200 with the plain-text body `OK`.
pub fn ok_text() -> Response {
    (StatusCode::OK, OK_TEXT).into_response()
}
