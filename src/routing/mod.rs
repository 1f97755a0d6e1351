//! Routes as plain data and the per-entity CRUD generator.

mod generator;
mod route;

pub use generator::{CrudApi, CrudSchemas};
pub use route::{
    handler, pre_handler, Handler, HandlerFuture, Method, PreHandler, PreHandlerFuture, Route, RouteDocs,
    RouteRequest,
};
