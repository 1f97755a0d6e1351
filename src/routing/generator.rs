//! CRUD route generator: five documented routes per entity, wired to a [`Repository`].

use super::route::{handler, Handler, Method, PreHandler, Route, RouteDocs, RouteRequest};
use crate::entity::{Entity, EntityDescriptor, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
use crate::error::AppError;
use crate::response::{ok_text, success_item, success_items, OK_TEXT};
use crate::schema::{self, create_schema_name, update_schema_name, ERROR_SCHEMA, SUCCESS_SCHEMA};
use crate::service::{user_fields, RequestValidator};
use crate::store::Repository;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use std::sync::Arc;
use utoipa::openapi::content::ContentBuilder;
use utoipa::openapi::path::{Parameter, ParameterBuilder, ParameterIn};
use utoipa::openapi::request_body::{RequestBody, RequestBodyBuilder};
use utoipa::openapi::response::{self as oa_response, ResponseBuilder, Responses, ResponsesBuilder};
use utoipa::openapi::schema::{ObjectBuilder, Type};
use utoipa::openapi::{Ref, RefOr, Required, Schema};

const JSON: &str = "application/json";
const TEXT: &str = "text/plain";

/// Request-body shapes attached to the create and update routes.
///
/// A missing shape leaves the route callable but undocumented.
#[derive(Clone, Debug, Default)]
pub struct CrudSchemas {
    pub create: Option<RefOr<Schema>>,
    pub update: Option<RefOr<Schema>>,
}

impl CrudSchemas {
    /// Create and update shapes derived from the entity's user fields.
    pub fn for_entity(entity: &EntityDescriptor) -> Self {
        CrudSchemas {
            create: Some(schema::create_schema(entity)),
            update: Some(schema::update_schema(entity)),
        }
    }

    /// Sets the create shape; a later call replaces the earlier value.
    pub fn with_create(mut self, shape: RefOr<Schema>) -> Self {
        self.create = Some(shape);
        self
    }

    /// Sets the update shape; a later call replaces the earlier value.
    pub fn with_update(mut self, shape: RefOr<Schema>) -> Self {
        self.update = Some(shape);
        self
    }
}

pub struct CrudApi<T: Entity> {
    entity: Arc<EntityDescriptor>,
    store: Arc<dyn Repository<T>>,
    schemas: CrudSchemas,
    pre_handlers: Vec<PreHandler>,
}

impl<T: Entity> CrudApi<T> {
    pub fn new(store: Arc<dyn Repository<T>>, schemas: CrudSchemas) -> Self {
        let entity = T::descriptor();
        tracing::info!(
            entity = %entity.name(),
            path = %entity.collection_path(),
            "CRUD API initialized"
        );
        CrudApi {
            entity: Arc::new(entity),
            store,
            schemas,
            pre_handlers: Vec::new(),
        }
    }

    /// Adds a step that runs before every generated handler, in insertion order.
    pub fn with_pre_handler(mut self, step: PreHandler) -> Self {
        self.pre_handlers.push(step);
        self
    }

    pub fn entity(&self) -> &EntityDescriptor {
        &self.entity
    }

    pub fn schemas(&self) -> &CrudSchemas {
        &self.schemas
    }

    /// All five routes: list, get one, create, update, delete.
    pub fn routes(&self) -> Vec<Route> {
        vec![
            self.list_route(),
            self.get_one_route(),
            self.create_route(),
            self.update_route(),
            self.delete_route(),
        ]
    }

    fn route(&self, method: Method, path: String, docs: RouteDocs, h: Handler) -> Route {
        Route {
            method,
            path,
            entity: self.entity.clone(),
            create_schema: None,
            update_schema: None,
            pre_handlers: self.pre_handlers.clone(),
            handler: h,
            docs,
        }
    }

    /// `GET /{plural}`
    pub fn list_route(&self) -> Route {
        let store = self.store.clone();
        let e = &self.entity;
        let docs = RouteDocs {
            summary: format!("Get {}s", e.name()),
            description: format!("This endpoint retrieves a list of {}s.", e.lower_name()),
            tags: vec![e.tag()],
            parameters: Vec::new(),
            request_body: None,
            responses: responses(
                success_json(&format!("{}s retrieved successfully.", e.name())),
                false,
            ),
        };
        let h = handler(move |_req: RouteRequest| {
            let store = store.clone();
            async move { list(store).await.into_response() }
        });
        self.route(Method::Get, e.collection_path(), docs, h)
    }

    /// `GET /{plural}/{id}`
    pub fn get_one_route(&self) -> Route {
        let store = self.store.clone();
        let entity = self.entity.clone();
        let e = &self.entity;
        let docs = RouteDocs {
            summary: format!("Get {}", e.name()),
            description: format!("This endpoint retrieves an existing {}.", e.lower_name()),
            tags: vec![e.tag()],
            parameters: vec![id_parameter()],
            request_body: None,
            responses: responses(
                success_json(&format!("{} retrieved successfully.", e.name())),
                true,
            ),
        };
        let h = handler(move |req: RouteRequest| {
            let store = store.clone();
            let entity = entity.clone();
            async move { get_one(store, entity, req).await.into_response() }
        });
        self.route(Method::Get, e.item_path(), docs, h)
    }

    /// `POST /{plural}`
    pub fn create_route(&self) -> Route {
        let store = self.store.clone();
        let entity = self.entity.clone();
        let e = &self.entity;
        let docs = RouteDocs {
            summary: format!("Create {}", e.name()),
            description: format!("This endpoint creates a new {}.", e.lower_name()),
            tags: vec![e.tag()],
            parameters: Vec::new(),
            request_body: Some(request_body(
                &create_schema_name(e.name()),
                &format!("Payload to create a new {}.", e.lower_name()),
            )),
            responses: responses(ok_plain(&format!("{} created successfully.", e.name())), false),
        };
        let h = handler(move |req: RouteRequest| {
            let store = store.clone();
            let entity = entity.clone();
            async move { create(store, entity, req).await.into_response() }
        });
        let mut route = self.route(Method::Post, e.collection_path(), docs, h);
        route.create_schema = self.schemas.create.clone();
        route
    }

    /// `PUT /{plural}/{id}`
    pub fn update_route(&self) -> Route {
        let store = self.store.clone();
        let entity = self.entity.clone();
        let e = &self.entity;
        let docs = RouteDocs {
            summary: format!("Update {}", e.name()),
            description: format!("This endpoint updates an existing {}.", e.lower_name()),
            tags: vec![e.tag()],
            parameters: vec![id_parameter()],
            request_body: Some(request_body(
                &update_schema_name(e.name()),
                &format!("Payload to update an existing {}.", e.lower_name()),
            )),
            responses: responses(ok_plain(&format!("{} updated successfully.", e.name())), true),
        };
        let h = handler(move |req: RouteRequest| {
            let store = store.clone();
            let entity = entity.clone();
            async move { update(store, entity, req).await.into_response() }
        });
        let mut route = self.route(Method::Put, e.item_path(), docs, h);
        route.update_schema = self.schemas.update.clone();
        route
    }

    /// `DELETE /{plural}/{id}`
    pub fn delete_route(&self) -> Route {
        let store = self.store.clone();
        let entity = self.entity.clone();
        let e = &self.entity;
        let docs = RouteDocs {
            summary: format!("Delete {}", e.name()),
            description: format!("This endpoint deletes an existing {}.", e.lower_name()),
            tags: vec![e.tag()],
            parameters: vec![id_parameter()],
            request_body: None,
            responses: responses(ok_plain(&format!("{} deleted successfully.", e.name())), true),
        };
        let h = handler(move |req: RouteRequest| {
            let store = store.clone();
            let entity = entity.clone();
            async move { delete(store, entity, req).await.into_response() }
        });
        self.route(Method::Delete, e.item_path(), docs, h)
    }
}

async fn list<T: Entity>(store: Arc<dyn Repository<T>>) -> Result<Response, AppError> {
    let items = store.find_all().await.map_err(AppError::from_store)?;
    Ok(success_items(items))
}

async fn get_one<T: Entity>(
    store: Arc<dyn Repository<T>>,
    entity: Arc<EntityDescriptor>,
    req: RouteRequest,
) -> Result<Response, AppError> {
    let id = req.param(ID_FIELD)?;
    let item = store
        .find_one(id)
        .await
        .map_err(|e| AppError::from_scoped_store(e, &entity))?;
    Ok(success_item(item))
}

async fn create<T: Entity>(
    store: Arc<dyn Repository<T>>,
    entity: Arc<EntityDescriptor>,
    req: RouteRequest,
) -> Result<Response, AppError> {
    let body = req.json_object()?;
    RequestValidator::validate(&body, &entity)?;
    let record: T = new_record(body, &entity)?;
    store.create(record).await.map_err(AppError::from_store)?;
    tracing::debug!(entity = %entity.name(), "record created");
    Ok(ok_text())
}

async fn update<T: Entity>(
    store: Arc<dyn Repository<T>>,
    entity: Arc<EntityDescriptor>,
    req: RouteRequest,
) -> Result<Response, AppError> {
    let id = req.param(ID_FIELD)?.to_string();
    let body = req.json_object()?;
    RequestValidator::validate_partial(&body, &entity)?;
    let patch = user_fields(body, &entity);
    store
        .update(&id, patch)
        .await
        .map_err(|e| AppError::from_scoped_store(e, &entity))?;
    Ok(ok_text())
}

async fn delete<T: Entity>(
    store: Arc<dyn Repository<T>>,
    entity: Arc<EntityDescriptor>,
    req: RouteRequest,
) -> Result<Response, AppError> {
    let id = req.param(ID_FIELD)?;
    store
        .delete(id)
        .await
        .map_err(|e| AppError::from_scoped_store(e, &entity))?;
    Ok(ok_text())
}

/// User fields of `body` plus a fresh id and identical creation/modification times.
fn new_record<T: Entity>(body: Map<String, Value>, entity: &EntityDescriptor) -> Result<T, AppError> {
    let mut record = user_fields(body, entity);
    let now = Value::String(chrono::Utc::now().to_rfc3339());
    record.insert(ID_FIELD.to_string(), Value::String(uuid::Uuid::new_v4().to_string()));
    record.insert(CREATED_AT_FIELD.to_string(), now.clone());
    record.insert(UPDATED_AT_FIELD.to_string(), now);
    serde_json::from_value(Value::Object(record)).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn id_parameter() -> Parameter {
    ParameterBuilder::new()
        .name(ID_FIELD)
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .schema(Some(schema::uuid_schema()))
        .build()
}

fn request_body(schema_name: &str, description: &str) -> RequestBody {
    RequestBodyBuilder::new()
        .description(Some(description))
        .required(Some(Required::True))
        .content(
            JSON,
            ContentBuilder::new()
                .schema(Some(Ref::from_schema_name(schema_name)))
                .build(),
        )
        .build()
}

fn success_json(description: &str) -> oa_response::Response {
    ResponseBuilder::new()
        .description(description)
        .content(
            JSON,
            ContentBuilder::new()
                .schema(Some(Ref::from_schema_name(SUCCESS_SCHEMA)))
                .build(),
        )
        .build()
}

fn ok_plain(description: &str) -> oa_response::Response {
    let text = ObjectBuilder::new()
        .schema_type(Type::String)
        .default(Some(Value::String(OK_TEXT.to_string())))
        .build();
    ResponseBuilder::new()
        .description(description)
        .content(TEXT, ContentBuilder::new().schema(Some(text)).build())
        .build()
}

fn error_response(description: &str) -> oa_response::Response {
    ResponseBuilder::new()
        .description(description)
        .content(
            JSON,
            ContentBuilder::new()
                .schema(Some(Ref::from_schema_name(ERROR_SCHEMA)))
                .build(),
        )
        .build()
}

/// Success plus the shared error statuses; 404 only on id-scoped routes.
fn responses(success: oa_response::Response, with_not_found: bool) -> Responses {
    let mut b = ResponsesBuilder::new()
        .response("200", success)
        .response("400", error_response("Bad Request"))
        .response("401", error_response("Unauthorized"))
        .response("403", error_response("Forbidden"));
    if with_not_found {
        b = b.response("404", error_response("Not Found"));
    }
    b.response("500", error_response("Internal Server Error")).build()
}
