//! Collects CRUD APIs for several entities and turns them into one served application.

use crate::config::{validate_entities, Settings};
use crate::entity::Entity;
use crate::error::ConfigError;
use crate::openapi;
use crate::routes;
use crate::routing::{CrudApi, Route};
use crate::schema::SchemaRegistry;
use axum::Router;
use utoipa::openapi::OpenApi;

pub struct HttpApi {
    settings: Settings,
    registry: SchemaRegistry,
    routes: Vec<Route>,
}

impl HttpApi {
    pub fn new(settings: Settings) -> Self {
        HttpApi {
            settings,
            registry: SchemaRegistry::default(),
            routes: Vec::new(),
        }
    }

    /// Registers the entity and appends its five routes.
    pub fn with_crud<T: Entity>(mut self, api: CrudApi<T>) -> Self {
        self.registry.register(api.entity().clone());
        self.routes.extend(api.routes());
        self
    }

    /// Appends hand-built routes; they are bound and documented like generated ones,
    /// and the entities they serve are registered if not already known.
    pub fn with_routes(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
        for route in routes {
            if self.registry.entity(route.entity()).is_none() {
                self.registry.register(route.descriptor().clone());
            }
            self.routes.push(route);
        }
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn openapi(&self) -> OpenApi {
        openapi::assemble(&self.settings, &self.registry, &self.routes)
    }

    /// Validates every registered entity, then builds the application router.
    pub fn into_router(self) -> Result<Router, ConfigError> {
        validate_entities(self.registry.entities())?;
        let doc = self.openapi();
        tracing::info!(
            routes = self.routes.len(),
            entities = self.registry.entities().len(),
            prefix = %self.settings.docs_prefix,
            "application router built"
        );
        Ok(routes::app(&self.routes, doc, &self.settings.docs_prefix))
    }
}
