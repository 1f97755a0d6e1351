//! Route definitions shared by the HTTP binder and the API document assembler.

use crate::entity::EntityDescriptor;
use crate::error::AppError;
use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodFilter;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use utoipa::openapi::path::{Operation, OperationBuilder, Parameter};
use utoipa::openapi::request_body::RequestBody;
use utoipa::openapi::response::Responses;
use utoipa::openapi::{RefOr, Schema};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    pub fn method_filter(self) -> MethodFilter {
        match self {
            Method::Get => MethodFilter::GET,
            Method::Post => MethodFilter::POST,
            Method::Put => MethodFilter::PUT,
            Method::Delete => MethodFilter::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What pre-handlers and handlers see of a request.
#[derive(Clone, Debug, Default)]
pub struct RouteRequest {
    pub method: axum::http::Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Named path parameters, e.g. `id`.
    pub params: HashMap<String, String>,
    pub body: Bytes,
}

impl RouteRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Header value as text; absent or non-ASCII values are `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Path parameter by name; absent is a Bad Request.
    pub fn param(&self, name: &str) -> Result<&str, AppError> {
        self.params
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| AppError::BadRequest(format!("missing path parameter: {}", name)))
    }

    /// Body parsed as a JSON object; malformed JSON or a non-object is a Bad Request.
    pub fn json_object(&self) -> Result<Map<String, Value>, AppError> {
        match serde_json::from_slice::<Value>(&self.body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(AppError::BadRequest("request body must be a JSON object".into())),
            Err(e) => Err(AppError::BadRequest(e.to_string())),
        }
    }
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Terminal request handler of a route.
pub type Handler = Arc<dyn Fn(RouteRequest) -> HandlerFuture + Send + Sync>;

pub type PreHandlerFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send>>;

/// Step run before the handler, in order; an error short-circuits the chain.
pub type PreHandler = Arc<dyn Fn(RouteRequest) -> PreHandlerFuture + Send + Sync>;

/// Wrap an async function as a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)))
}

/// Wrap an async check as a [`PreHandler`].
pub fn pre_handler<F, Fut>(f: F) -> PreHandler
where
    F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), AppError>> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)))
}

/// Documentation metadata of one operation.
#[derive(Clone)]
pub struct RouteDocs {
    pub summary: String,
    pub description: String,
    pub tags: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    pub responses: Responses,
}

impl RouteDocs {
    pub fn to_operation(&self) -> Operation {
        let builder = self
            .tags
            .iter()
            .fold(OperationBuilder::new(), |b, t| b.tag(t.as_str()));
        let builder = self
            .parameters
            .iter()
            .fold(builder, |b, p| b.parameter(p.clone()));
        builder
            .summary(Some(self.summary.as_str()))
            .description(Some(self.description.as_str()))
            .request_body(self.request_body.clone())
            .responses(self.responses.clone())
            .build()
    }
}

/// One method + path + handler chain + documentation unit. Immutable once built.
#[derive(Clone)]
pub struct Route {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) entity: Arc<EntityDescriptor>,
    pub(crate) create_schema: Option<RefOr<Schema>>,
    pub(crate) update_schema: Option<RefOr<Schema>>,
    pub(crate) pre_handlers: Vec<PreHandler>,
    pub(crate) handler: Handler,
    pub(crate) docs: RouteDocs,
}

impl Route {
    pub fn method(&self) -> Method {
        self.method
    }

    /// Path with `{name}` placeholders, without any mount prefix.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name of the entity the route serves.
    pub fn entity(&self) -> &str {
        self.entity.name()
    }

    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.entity
    }

    pub fn create_schema(&self) -> Option<&RefOr<Schema>> {
        self.create_schema.as_ref()
    }

    pub fn update_schema(&self) -> Option<&RefOr<Schema>> {
        self.update_schema.as_ref()
    }

    pub fn docs(&self) -> &RouteDocs {
        &self.docs
    }

    pub fn pre_handlers(&self) -> &[PreHandler] {
        &self.pre_handlers
    }

    /// Run the pre-handler chain, then the handler.
    pub async fn call(&self, req: RouteRequest) -> Response {
        for step in &self.pre_handlers {
            if let Err(e) = step(req.clone()).await {
                return e.into_response();
            }
        }
        (self.handler)(req).await
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("entity", &self.entity.name())
            .field("create_schema", &self.create_schema.is_some())
            .field("update_schema", &self.update_schema.is_some())
            .field("pre_handlers", &self.pre_handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_param_is_bad_request() {
        let req = RouteRequest::new();
        assert!(matches!(req.param("id"), Err(AppError::BadRequest(_))));
        let req = req.with_param("id", "abc");
        assert_eq!(req.param("id").unwrap(), "abc");
    }

    #[test]
    fn body_must_be_json_object() {
        let req = RouteRequest::new().with_body("{\"name\":\"Ann\"}");
        assert_eq!(req.json_object().unwrap()["name"], "Ann");
        assert!(RouteRequest::new().with_body("[1,2]").json_object().is_err());
        assert!(RouteRequest::new().with_body("{not json").json_object().is_err());
        assert!(RouteRequest::new().json_object().is_err());
    }

    #[test]
    fn headers_are_readable() {
        let req = RouteRequest::new().with_header(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer token"),
        );
        assert_eq!(req.header("authorization"), Some("Bearer token"));
        assert_eq!(req.header("x-missing"), None);
    }

    #[test]
    fn method_names() {
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert_eq!(Method::Put.method_filter(), MethodFilter::PUT);
    }
}
