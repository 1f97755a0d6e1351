//! Startup DDL: create the database if needed, then one table per entity.

use crate::entity::EntityDescriptor;
use crate::error::StoreError;
use crate::sql;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// CREATE TABLE IF NOT EXISTS for one entity. Idempotent.
pub async fn ensure_table(pool: &PgPool, entity: &EntityDescriptor) -> Result<(), StoreError> {
    let ddl = sql::create_table(entity);
    tracing::debug!(sql = %ddl, "migrate");
    sqlx::query(&ddl).execute(pool).await?;
    tracing::info!(entity = entity.name(), table = entity.path_segment(), "table ready");
    Ok(())
}

pub async fn ensure_tables(pool: &PgPool, entities: &[EntityDescriptor]) -> Result<(), StoreError> {
    for entity in entities {
        ensure_table(pool, entity).await?;
    }
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| StoreError::Other(format!("invalid database url: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "database created");
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), StoreError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| StoreError::Other("database url: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
