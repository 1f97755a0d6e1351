mod common;

use axum::http::StatusCode;
use common::{json, router, send, send_with_headers, text, user, users_api, User};
use dynamic_crud::{pre_handler, AppError, HttpApi, MemoryStore, Repository, RouteRequest, Settings};
use serde_json::Value;
use std::sync::Arc;

#[tokio::test]
async fn list_returns_every_persisted_record() {
    let (app, store) = router();
    let seeded = vec![
        user("Ann", "ann@example.com"),
        user("Bob", "bob@example.com"),
        user("Cyd", "cyd@example.com"),
    ];
    for u in &seeded {
        store.create(u.clone()).await.unwrap();
    }

    let resp = send(&app, "GET", "/users", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json(resp).await;
    let items: Vec<User> = serde_json::from_value(body["items"].clone()).unwrap();
    assert_eq!(items, seeded);
}

#[tokio::test]
async fn list_of_empty_store_is_empty_array() {
    let (app, _) = router();
    let body = json(send(&app, "GET", "/users", None).await).await;
    assert_eq!(body["items"], Value::Array(vec![]));
}

#[tokio::test]
async fn create_then_get_one() {
    let (app, _) = router();
    let resp = send(&app, "POST", "/users", Some(r#"{"name":"Ann","email":"a@b.com"}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(text(resp).await, "OK");

    let list = json(send(&app, "GET", "/users", None).await).await;
    let id = list["items"][0]["id"].as_str().unwrap().to_string();

    let resp = send(&app, "GET", &format!("/users/{}", id), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let item = &json(resp).await["item"];
    assert_eq!(item["id"], id.as_str());
    assert_eq!(item["name"], "Ann");
    assert_eq!(item["email"], "a@b.com");
    assert!(!item["createdAt"].as_str().unwrap().is_empty());
    assert!(!item["updatedAt"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn create_rejects_constraint_violations() {
    let (app, store) = router();
    for body in [
        r#"{"name":"An","email":"a@b.com"}"#,
        r#"{"name":"Ann","email":"not-an-email"}"#,
        r#"{"email":"a@b.com"}"#,
        r#"{"name":7,"email":"a@b.com"}"#,
    ] {
        let resp = send(&app, "POST", "/users", Some(body)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(json(resp).await["error"], "Bad Request");
    }
    assert!(store.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_unknown_or_malformed_id_is_not_found() {
    let (app, _) = router();
    for id in [uuid::Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let resp = send(&app, "GET", &format!("/users/{}", id), None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = json(resp).await;
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["message"], "The user was not found.");
    }
}

#[tokio::test]
async fn update_missing_record_is_not_found() {
    let (app, _) = router();
    let uri = format!("/users/{}", uuid::Uuid::new_v4());
    let resp = send(&app, "PUT", &uri, Some(r#"{"name":"Annabel"}"#)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(resp).await["error"], "Not Found");
}

#[tokio::test]
async fn update_changes_only_submitted_fields() {
    let (app, store) = router();
    let before = user("Ann", "ann@example.com");
    store.create(before.clone()).await.unwrap();

    let uri = format!("/users/{}", before.id);
    let resp = send(&app, "PUT", &uri, Some(r#"{"name":"Annabel","createdAt":"2000-01-01T00:00:00Z"}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(text(resp).await, "OK");

    let stored = store.find_one(&before.id.to_string()).await.unwrap();
    assert_eq!(stored.name, "Annabel");
    assert_eq!(stored.email, before.email);
    assert_eq!(stored.created_at, before.created_at);
    assert!(stored.updated_at >= before.updated_at);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let (app, store) = router();
    let u = user("Ann", "ann@example.com");
    store.create(u.clone()).await.unwrap();
    let uri = format!("/users/{}", u.id);

    let resp = send(&app, "DELETE", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(text(resp).await, "OK");

    let resp = send(&app, "GET", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&app, "DELETE", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (app, store) = router();
    let u = user("Ann", "ann@example.com");
    store.create(u.clone()).await.unwrap();

    let resp = send(&app, "POST", "/users", Some("{\"name\": ")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(resp).await["error"], "Bad Request");

    let resp = send(&app, "PUT", &format!("/users/{}", u.id), Some("[not json")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&app, "POST", "/users", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn document_merges_methods_per_path() {
    let store = Arc::new(MemoryStore::<User>::new());
    let api = HttpApi::new(Settings::default()).with_crud(users_api(store));
    let doc = serde_json::to_value(api.openapi()).unwrap();
    let paths = doc["paths"].as_object().unwrap();
    assert_eq!(paths.len(), 2);

    let collection = paths["/api/users"].as_object().unwrap();
    let mut methods: Vec<&str> = collection.keys().map(String::as_str).collect();
    methods.sort();
    assert_eq!(methods, vec!["get", "post"]);

    let item = paths["/api/users/{id}"].as_object().unwrap();
    let mut methods: Vec<&str> = item.keys().map(String::as_str).collect();
    methods.sort();
    assert_eq!(methods, vec!["delete", "get", "put"]);
}

#[tokio::test]
async fn app_serves_crud_and_document_under_prefix() {
    let store = Arc::new(MemoryStore::<User>::new());
    let app = HttpApi::new(Settings::default())
        .with_crud(users_api(store))
        .into_router()
        .unwrap();

    let resp = send(&app, "POST", "/api/users", Some(r#"{"name":"Ann","email":"a@b.com"}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json(send(&app, "GET", "/api/users", None).await).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let doc = json(send(&app, "GET", "/api/openapi.json", None).await).await;
    assert!(doc["components"]["schemas"]["CreateUser"].is_object());
    assert!(doc["paths"]["/api/users/{id}"]["put"].is_object());

    let resp = send(&app, "GET", "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(send(&app, "GET", "/users", None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_routes_are_bound_once() {
    let store = Arc::new(MemoryStore::<User>::new());
    let api = users_api(store);
    let mut routes = api.routes();
    routes.extend(api.routes());
    let app = dynamic_crud::binder::bind(&routes);
    assert_eq!(send(&app, "GET", "/users", None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn pre_handler_sees_request_headers() {
    let store = Arc::new(MemoryStore::<User>::new());
    let require_auth = pre_handler(|req: RouteRequest| async move {
        match req.header("authorization") {
            Some(v) if v.starts_with("Bearer ") => Ok(()),
            _ => Err(AppError::Unauthorized("missing bearer token".into())),
        }
    });
    let api = users_api(store).with_pre_handler(require_auth);
    let app = dynamic_crud::binder::bind(&api.routes());

    let resp = send(&app, "GET", "/users", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = json(resp).await;
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(body["message"], "missing bearer token");

    let resp = send_with_headers(&app, "GET", "/users", &[("Authorization", "Bearer secret")], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn hand_added_routes_register_their_entity() {
    let store = Arc::new(MemoryStore::<User>::new());
    let api = HttpApi::new(Settings::default()).with_routes(users_api(store).routes());
    assert!(api.registry().entity("User").is_some());

    let doc = serde_json::to_value(api.openapi()).unwrap();
    let schemas = doc["components"]["schemas"].as_object().unwrap();
    let mut names: Vec<&str> = schemas.keys().map(String::as_str).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["CreateUser", "ErrorResponse", "SuccessResponse", "UpdateUser", "User"]
    );
    assert_eq!(
        schemas["SuccessResponse"]["properties"]["item"]["anyOf"][0]["$ref"],
        "#/components/schemas/User"
    );
}
