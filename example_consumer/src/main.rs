//! Example consumer: serves a User CRUD API and its document.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Set `APP_DSN` to persist in PostgreSQL; without it records live in memory.

use chrono::{DateTime, Utc};
use dynamic_crud::{
    ensure_database_exists, ensure_table, init_tracing, CrudApi, CrudSchemas, Entity,
    FieldDescriptor, HttpApi, MemoryStore, PgStore, Repository, Settings, EMAIL_PATTERN,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    id: Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
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

async fn user_store(settings: &Settings) -> Result<Arc<dyn Repository<User>>, Box<dyn std::error::Error>> {
    let Some(url) = settings.database_url.as_deref() else {
        tracing::info!("APP_DSN not set; using in-memory store");
        return Ok(Arc::new(MemoryStore::<User>::new()));
    };
    ensure_database_exists(url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await?;
    ensure_table(&pool, &User::descriptor()).await?;
    Ok(Arc::new(PgStore::<User>::new(pool)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    init_tracing("dynamic_crud=info,example_consumer=info");

    let store = user_store(&settings).await?;
    let users = CrudApi::new(store, CrudSchemas::for_entity(&User::descriptor()));
    let port = settings.port;
    let prefix = settings.docs_prefix.clone();
    let app = HttpApi::new(settings).with_crud(users).into_router()?;

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(
        "Example consumer listening on http://127.0.0.1:{} (document at {}/openapi.json)",
        port,
        prefix
    );
    axum::serve(listener, app).await?;
    Ok(())
}
