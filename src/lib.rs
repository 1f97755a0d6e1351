//! Dynamic CRUD: generated CRUD routes and an OpenAPI document from entity definitions.

pub mod api;
pub mod binder;
pub mod case;
pub mod config;
pub mod entity;
pub mod error;
pub mod migration;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod routing;
pub mod schema;
pub mod service;
pub mod sql;
pub mod store;

pub use api::HttpApi;
pub use config::{init_tracing, validate_entities, Settings};
pub use entity::{Entity, EntityDescriptor, FieldDescriptor, FieldType};
pub use error::{AppError, ConfigError, ErrorBody, StoreError};
pub use migration::{ensure_database_exists, ensure_table, ensure_tables};
pub use response::{ItemBody, ItemsBody, OK_TEXT};
pub use routes::{app, common_routes, docs_routes};
pub use routing::{pre_handler, CrudApi, CrudSchemas, Method, PreHandler, Route, RouteDocs, RouteRequest};
pub use schema::SchemaRegistry;
pub use service::{RequestValidator, EMAIL_PATTERN};
pub use store::{MemoryStore, Patch, PgStore, Repository};
