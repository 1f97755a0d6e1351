//! PostgreSQL store: one table per entity, statements built from the descriptor.

use super::{parse_record_id, Patch, Repository};
use crate::entity::{Entity, EntityDescriptor, FieldType};
use crate::error::StoreError;
use crate::sql::{self, PgBindValue, QueryBuf, TableColumn};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use std::marker::PhantomData;

pub struct PgStore<T> {
    pool: PgPool,
    entity: EntityDescriptor,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> PgStore<T> {
    pub fn new(pool: PgPool) -> Self {
        PgStore {
            pool,
            entity: T::descriptor(),
            _entity: PhantomData,
        }
    }

    pub fn entity(&self) -> &EntityDescriptor {
        &self.entity
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn fetch(&self, q: &QueryBuf) -> Result<Vec<PgRow>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    fn decode(&self, row: &PgRow) -> Result<T, StoreError> {
        let value = row_to_json(row, &sql::table_columns(&self.entity))?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for PgStore<T> {
    async fn create(&self, record: T) -> Result<(), StoreError> {
        let value = serde_json::to_value(&record)?;
        let Value::Object(map) = value else {
            return Err(StoreError::Other(format!("{} must serialize to an object", T::NAME)));
        };
        self.execute(&sql::insert(&self.entity, &map)).await?;
        Ok(())
    }

    async fn update(&self, id: &str, patch: Patch) -> Result<(), StoreError> {
        let id = parse_record_id(id)?.to_string();
        let affected = self.execute(&sql::update(&self.entity, &id, &patch)).await?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let id = parse_record_id(id)?.to_string();
        let affected = self.execute(&sql::delete(&self.entity, &id)).await?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn find_one(&self, id: &str) -> Result<T, StoreError> {
        let id = parse_record_id(id)?.to_string();
        let rows = self.fetch(&sql::select_by_id(&self.entity, &id)).await?;
        let row = rows.first().ok_or(StoreError::NotFound)?;
        self.decode(row)
    }

    async fn find_all(&self) -> Result<Vec<T>, StoreError> {
        let rows = self.fetch(&sql::select_all(&self.entity)).await?;
        rows.iter().map(|r| self.decode(r)).collect()
    }
}

/// Row to JSON object keyed by the API field names.
fn row_to_json(row: &PgRow, columns: &[TableColumn]) -> Result<Value, StoreError> {
    let mut map = Map::new();
    for c in columns {
        map.insert(c.json_key.clone(), cell_to_value(row, c)?);
    }
    Ok(Value::Object(map))
}

fn cell_to_value(row: &PgRow, column: &TableColumn) -> Result<Value, StoreError> {
    use sqlx::Row;
    let name = column.name.as_str();
    let value = match column.field_type {
        FieldType::String => row.try_get::<Option<String>, _>(name)?.map(Value::String),
        FieldType::Uuid => row
            .try_get::<Option<uuid::Uuid>, _>(name)?
            .map(|u| Value::String(u.to_string())),
        FieldType::DateTime => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name)?
            .map(|d| Value::String(d.to_rfc3339())),
        FieldType::Integer => row.try_get::<Option<i64>, _>(name)?.map(|n| Value::Number(n.into())),
        FieldType::Number => row
            .try_get::<Option<f64>, _>(name)?
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        FieldType::Boolean => row.try_get::<Option<bool>, _>(name)?.map(Value::Bool),
    };
    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FieldDescriptor;
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Gadget {
        id: Uuid,
        label: String,
        stock: i64,
        price: f64,
        active: bool,
        released_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    }

    impl Entity for Gadget {
        const NAME: &'static str = "Gadget";

        fn fields() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::string("label"),
                FieldDescriptor::new("stock", FieldType::Integer),
                FieldDescriptor::new("price", FieldType::Number),
                FieldDescriptor::new("active", FieldType::Boolean),
                FieldDescriptor::new("releasedAt", FieldType::DateTime).optional(),
            ]
        }
    }

    /// Needs a reachable PostgreSQL in `APP_DSN`: `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn write_then_read_back_every_column_type() {
        let Ok(url) = std::env::var("APP_DSN") else {
            return;
        };
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .unwrap();
        sqlx::query("DROP TABLE IF EXISTS \"gadgets\"")
            .execute(&pool)
            .await
            .unwrap();
        crate::migration::ensure_table(&pool, &Gadget::descriptor()).await.unwrap();
        let store = PgStore::<Gadget>::new(pool.clone());

        // Whole seconds: timestamptz keeps microseconds only.
        let stamp = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let gadget = Gadget {
            id: Uuid::new_v4(),
            label: "lamp".into(),
            stock: 12,
            price: 19.5,
            active: true,
            released_at: None,
            created_at: stamp,
            updated_at: stamp,
        };
        store.create(gadget.clone()).await.unwrap();
        assert_eq!(store.find_one(&gadget.id.to_string()).await.unwrap(), gadget);

        let patch = json!({"stock": 3, "releasedAt": "2024-06-01T00:00:00Z"})
            .as_object()
            .cloned()
            .unwrap();
        store.update(&gadget.id.to_string(), patch).await.unwrap();
        let got = store.find_one(&gadget.id.to_string()).await.unwrap();
        assert_eq!(got.stock, 3);
        assert_eq!(got.label, "lamp");
        assert_eq!(got.price, 19.5);
        assert_eq!(got.released_at, Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()));
        assert_eq!(got.created_at, stamp);
        assert!(got.updated_at > stamp);

        assert_eq!(store.find_all().await.unwrap().len(), 1);
        store.delete(&gadget.id.to_string()).await.unwrap();
        assert!(matches!(
            store.find_one(&gadget.id.to_string()).await,
            Err(StoreError::NotFound)
        ));
        sqlx::query("DROP TABLE \"gadgets\"").execute(&pool).await.unwrap();
    }
}
