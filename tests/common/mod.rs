#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use dynamic_crud::{
    binder, CrudApi, CrudSchemas, Entity, FieldDescriptor, MemoryStore, Repository, EMAIL_PATTERN,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    const NAME: &'static str = "User";

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::string("name").with_min_length(3),
            FieldDescriptor::string("email")
                .with_format("email")
                .with_pattern(EMAIL_PATTERN),
        ]
    }
}

pub fn user(name: &str, email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        name: name.into(),
        email: email.into(),
        created_at: now,
        updated_at: now,
    }
}

pub fn users_api(store: Arc<MemoryStore<User>>) -> CrudApi<User> {
    let store: Arc<dyn Repository<User>> = store;
    CrudApi::new(store, CrudSchemas::for_entity(&User::descriptor()))
}

/// Unprefixed router over a fresh in-memory store; the store is returned for seeding.
pub fn router() -> (Router, Arc<MemoryStore<User>>) {
    let store = Arc::new(MemoryStore::<User>::new());
    let app = binder::bind(&users_api(store.clone()).routes());
    (app, store)
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> Response<Body> {
    send_with_headers(app, method, uri, &[], body).await
}

pub async fn send_with_headers(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> Response<Body> {
    let mut req = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        req = req.header(*name, *value);
    }
    if body.is_some() {
        req = req.header("Content-Type", "application/json");
    }
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
    app.clone().oneshot(req.body(body).unwrap()).await.unwrap()
}

pub async fn text(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn json(resp: Response<Body>) -> Value {
    serde_json::from_str(&text(resp).await).unwrap()
}
