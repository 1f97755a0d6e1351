//! Persistence Adapter contract and its implementations.
//!
//! Handlers only see [`Repository`]; implementations must be safe to share across
//! concurrent requests behind an `Arc`.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::entity::Entity;
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Submitted user fields of an update, keyed by JSON field name. Keys absent here stay unchanged.
pub type Patch = Map<String, Value>;

#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Persist a new record. The record already carries its id and timestamps.
    async fn create(&self, record: T) -> Result<(), StoreError>;

    /// Apply `patch` to the record with `id` and refresh its modification time.
    async fn update(&self, id: &str, patch: Patch) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn find_one(&self, id: &str) -> Result<T, StoreError>;

    async fn find_all(&self) -> Result<Vec<T>, StoreError>;
}

/// Parse a path identifier; anything that is not a UUID cannot match a record.
pub(crate) fn parse_record_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|_| StoreError::NotFound)
}
