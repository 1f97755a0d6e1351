//! Builds parameterized INSERT, SELECT, UPDATE, DELETE and CREATE TABLE from an entity descriptor.

use crate::case::to_snake_case;
use crate::entity::{EntityDescriptor, FieldType, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from descriptors).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// One stored column: snake_case name, the JSON key it maps to, and its type.
#[derive(Clone, Debug, PartialEq)]
pub struct TableColumn {
    pub name: String,
    pub json_key: String,
    pub field_type: FieldType,
    pub not_null: bool,
}

impl TableColumn {
    fn new(json_key: &str, field_type: FieldType, not_null: bool) -> Self {
        TableColumn {
            name: to_snake_case(json_key),
            json_key: json_key.to_string(),
            field_type,
            not_null,
        }
    }

    fn placeholder(&self, n: u32) -> String {
        format!("${}::{}", n, self.field_type.pg_type())
    }
}

/// `id`, declared fields in order, `created_at`, `updated_at`.
pub fn table_columns(entity: &EntityDescriptor) -> Vec<TableColumn> {
    let mut cols = vec![TableColumn::new(ID_FIELD, FieldType::Uuid, true)];
    for f in entity.fields() {
        cols.push(TableColumn::new(&f.name, f.field_type, f.required));
    }
    cols.push(TableColumn::new(CREATED_AT_FIELD, FieldType::DateTime, true));
    cols.push(TableColumn::new(UPDATED_AT_FIELD, FieldType::DateTime, true));
    cols
}

fn table(entity: &EntityDescriptor) -> String {
    quoted(entity.path_segment())
}

fn select_column_list(cols: &[TableColumn]) -> String {
    cols.iter()
        .map(|c| quoted(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

/// CREATE TABLE IF NOT EXISTS with uuid primary key and timestamp defaults.
pub fn create_table(entity: &EntityDescriptor) -> String {
    let defs: Vec<String> = table_columns(entity)
        .iter()
        .map(|c| {
            let mut def = format!("{} {}", quoted(&c.name), c.field_type.pg_type().to_uppercase());
            if c.json_key == ID_FIELD {
                def.push_str(" PRIMARY KEY DEFAULT gen_random_uuid()");
            } else if c.not_null {
                def.push_str(" NOT NULL");
            }
            if c.json_key == CREATED_AT_FIELD || c.json_key == UPDATED_AT_FIELD {
                def.push_str(" DEFAULT NOW()");
            }
            def
        })
        .collect();
    format!("CREATE TABLE IF NOT EXISTS {} ({})", table(entity), defs.join(", "))
}

/// SELECT every row, oldest first.
pub fn select_all(entity: &EntityDescriptor) -> QueryBuf {
    let mut q = QueryBuf::new();
    let cols = table_columns(entity);
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {}, {}",
        select_column_list(&cols),
        table(entity),
        quoted("created_at"),
        quoted("id")
    );
    q
}

/// SELECT by primary key.
pub fn select_by_id(entity: &EntityDescriptor, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let cols = table_columns(entity);
    let n = q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}::uuid",
        select_column_list(&cols),
        table(entity),
        quoted("id"),
        n
    );
    q
}

/// INSERT every column present in `record` (keyed by JSON key). Missing columns take their DB default.
pub fn insert(entity: &EntityDescriptor, record: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in table_columns(entity) {
        let Some(val) = record.get(&c.json_key) else { continue };
        let n = q.push_param(val.clone());
        cols.push(quoted(&c.name));
        placeholders.push(c.placeholder(n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table(entity),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE by id: SET only declared user fields present in `patch`, and always refresh `updated_at`.
pub fn update(entity: &EntityDescriptor, id: &str, patch: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in table_columns(entity) {
        if c.json_key == ID_FIELD || c.json_key == CREATED_AT_FIELD || c.json_key == UPDATED_AT_FIELD {
            continue;
        }
        let Some(val) = patch.get(&c.json_key) else { continue };
        let n = q.push_param(val.clone());
        sets.push(format!("{} = {}", quoted(&c.name), c.placeholder(n)));
    }
    sets.push(format!("{} = NOW()", quoted("updated_at")));
    let n = q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}::uuid",
        table(entity),
        sets.join(", "),
        quoted("id"),
        n
    );
    q
}

/// DELETE by id.
pub fn delete(entity: &EntityDescriptor, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Value::String(id.to_string()));
    q.sql = format!("DELETE FROM {} WHERE {} = ${}::uuid", table(entity), quoted("id"), n);
    q
}
