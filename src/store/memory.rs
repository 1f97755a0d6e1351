//! In-process store keeping records as JSON objects in insertion order.

use super::{parse_record_id, Patch, Repository};
use crate::entity::{Entity, ID_FIELD, UPDATED_AT_FIELD};
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

pub struct MemoryStore<T> {
    records: RwLock<Vec<(Uuid, Value)>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        MemoryStore {
            records: RwLock::new(Vec::new()),
            _entity: PhantomData,
        }
    }
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<G>(_: PoisonError<G>) -> StoreError {
    StoreError::Other("store lock poisoned".into())
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryStore<T> {
    async fn create(&self, record: T) -> Result<(), StoreError> {
        let value = serde_json::to_value(&record)?;
        let id = value
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| StoreError::Other(format!("{} record has no valid id", T::NAME)))?;
        let mut records = self.records.write().map_err(poisoned)?;
        if records.iter().any(|(existing, _)| *existing == id) {
            return Err(StoreError::Other(format!("duplicate id {}", id)));
        }
        records.push((id, value));
        Ok(())
    }

    async fn update(&self, id: &str, patch: Patch) -> Result<(), StoreError> {
        let id = parse_record_id(id)?;
        let mut records = self.records.write().map_err(poisoned)?;
        let (_, stored) = records
            .iter_mut()
            .find(|(existing, _)| *existing == id)
            .ok_or(StoreError::NotFound)?;
        let mut merged = stored.clone();
        if let Value::Object(obj) = &mut merged {
            obj.extend(patch);
            obj.insert(
                UPDATED_AT_FIELD.to_string(),
                Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        // Reject patches that would leave the record unreadable.
        serde_json::from_value::<T>(merged.clone())?;
        *stored = merged;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let id = parse_record_id(id)?;
        let mut records = self.records.write().map_err(poisoned)?;
        let before = records.len();
        records.retain(|(existing, _)| *existing != id);
        if records.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn find_one(&self, id: &str) -> Result<T, StoreError> {
        let id = parse_record_id(id)?;
        let records = self.records.read().map_err(poisoned)?;
        let (_, value) = records
            .iter()
            .find(|(existing, _)| *existing == id)
            .ok_or(StoreError::NotFound)?;
        Ok(serde_json::from_value(value.clone())?)
    }

    async fn find_all(&self) -> Result<Vec<T>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        records
            .iter()
            .map(|(_, v)| serde_json::from_value(v.clone()).map_err(StoreError::from))
            .collect()
    }
}
