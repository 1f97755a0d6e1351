//! API document assembly from the schema registry and the generated routes.

use crate::config::Settings;
use crate::routing::{Method, Route};
use crate::schema::{create_schema_name, update_schema_name, SchemaRegistry};
use utoipa::openapi::info::InfoBuilder;
use utoipa::openapi::path::{PathItem, Paths};
use utoipa::openapi::schema::ComponentsBuilder;
use utoipa::openapi::server::ServerBuilder;
use utoipa::openapi::{OpenApi, OpenApiBuilder};

/// Join the documentation prefix and a route path without doubling slashes.
pub fn documented_path(prefix: &str, path: &str) -> String {
    format!("{}{}", prefix.trim_end_matches('/'), path)
}

/// Build the document.
///
/// Routes sharing a path merge into one path item; a later route with the same path and
/// method replaces the earlier operation. POST and PUT routes without a request-body
/// shape are left out. The catalog always holds `ErrorResponse`, `SuccessResponse` and
/// every registered entity, plus `Create<Entity>` / `Update<Entity>` for documented
/// create and update routes. Entities served by `routes` but absent from `registry`
/// are added to the catalog.
///
/// The document declares `openapi: 3.1.0`, the version utoipa 5 emits. Its content
/// sticks to constructs that 3.0 readers accept: component `$ref`s, `anyOf`, `format`
/// and `required`.
pub fn assemble(settings: &Settings, registry: &SchemaRegistry, routes: &[Route]) -> OpenApi {
    let mut registry = registry.clone();
    for route in routes {
        if registry.entity(route.entity()).is_none() {
            registry.register(route.descriptor().clone());
        }
    }
    let mut schemas = registry.catalog();
    let mut paths = Paths::new();

    for route in routes {
        let body_shape = match route.method() {
            Method::Post => match route.create_schema() {
                Some(s) => Some((create_schema_name(route.entity()), s)),
                None => {
                    tracing::warn!(path = %route.path(), "create route has no schema; left out of document");
                    continue;
                }
            },
            Method::Put => match route.update_schema() {
                Some(s) => Some((update_schema_name(route.entity()), s)),
                None => {
                    tracing::warn!(path = %route.path(), "update route has no schema; left out of document");
                    continue;
                }
            },
            Method::Get | Method::Delete => None,
        };
        if let Some((name, shape)) = body_shape {
            schemas.insert(name, shape.clone());
        }

        let item: &mut PathItem = paths
            .paths
            .entry(documented_path(&settings.docs_prefix, route.path()))
            .or_default();
        let operation = Some(route.docs().to_operation());
        match route.method() {
            Method::Get => item.get = operation,
            Method::Post => item.post = operation,
            Method::Put => item.put = operation,
            Method::Delete => item.delete = operation,
        }
    }

    let servers = vec![
        ServerBuilder::new()
            .url(settings.development_url())
            .description(Some("Development"))
            .build(),
        ServerBuilder::new()
            .url(settings.base_url.as_str())
            .description(Some("Production"))
            .build(),
    ];

    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title(settings.app_name.as_str())
                .version(settings.app_version.as_str())
                .build(),
        )
        .servers(Some(servers))
        .paths(paths)
        .components(Some(ComponentsBuilder::new().schemas_from_iter(schemas).build()))
        .build()
}
