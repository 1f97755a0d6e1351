//! Schema Registry: named shape descriptions for entities and the shared envelopes.
//! Shapes only; request validation lives in [`crate::service::RequestValidator`].

use crate::entity::{EntityDescriptor, FieldDescriptor, FieldType, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
use std::collections::BTreeMap;
use utoipa::openapi::schema::{AnyOfBuilder, ArrayBuilder, KnownFormat, ObjectBuilder, Schema, SchemaFormat, Type};
use utoipa::openapi::{Ref, RefOr};

/// Catalog name of the error shape.
pub const ERROR_SCHEMA: &str = "ErrorResponse";
/// Catalog name of the success envelope.
pub const SUCCESS_SCHEMA: &str = "SuccessResponse";

pub fn create_schema_name(entity: &str) -> String {
    format!("Create{}", entity)
}

pub fn update_schema_name(entity: &str) -> String {
    format!("Update{}", entity)
}

fn schema_format(format: &str) -> SchemaFormat {
    match format {
        "uuid" => SchemaFormat::KnownFormat(KnownFormat::Uuid),
        "date-time" => SchemaFormat::KnownFormat(KnownFormat::DateTime),
        other => SchemaFormat::Custom(other.to_string()),
    }
}

fn json_type(field_type: FieldType) -> Type {
    match field_type {
        FieldType::String | FieldType::Uuid | FieldType::DateTime => Type::String,
        FieldType::Integer => Type::Integer,
        FieldType::Number => Type::Number,
        FieldType::Boolean => Type::Boolean,
    }
}

fn text_schema() -> RefOr<Schema> {
    ObjectBuilder::new()
        .schema_type(Type::String)
        .format(Some(SchemaFormat::Custom("text".into())))
        .build()
        .into()
}

pub fn uuid_schema() -> RefOr<Schema> {
    ObjectBuilder::new()
        .schema_type(Type::String)
        .format(Some(SchemaFormat::KnownFormat(KnownFormat::Uuid)))
        .build()
        .into()
}

fn date_time_schema() -> RefOr<Schema> {
    ObjectBuilder::new()
        .schema_type(Type::String)
        .format(Some(SchemaFormat::KnownFormat(KnownFormat::DateTime)))
        .build()
        .into()
}

/// Schema of a single declared field, carrying its format and length/pattern constraints.
pub fn field_schema(field: &FieldDescriptor) -> RefOr<Schema> {
    ObjectBuilder::new()
        .schema_type(json_type(field.field_type))
        .format(field.effective_format().map(schema_format))
        .min_length(field.min_length)
        .max_length(field.max_length)
        .pattern(field.pattern.clone())
        .build()
        .into()
}

/// `{error: string, message: string}`, both required.
pub fn error_schema() -> RefOr<Schema> {
    ObjectBuilder::new()
        .schema_type(Type::Object)
        .property("error", text_schema())
        .property("message", text_schema())
        .required("error")
        .required("message")
        .build()
        .into()
}

/// Envelope wrapping one instance of any known entity under `item`, or a sequence under `items`.
/// With no entities the element shape is unconstrained.
pub fn success_schema(entities: &[EntityDescriptor]) -> RefOr<Schema> {
    let any_entity = || -> RefOr<Schema> {
        if entities.is_empty() {
            return ObjectBuilder::new().build().into();
        }
        let any_of = entities
            .iter()
            .fold(AnyOfBuilder::new(), |b, e| b.item(Ref::from_schema_name(e.name())))
            .build();
        RefOr::T(Schema::AnyOf(any_of))
    };
    let items = RefOr::T(Schema::Array(ArrayBuilder::new().items(any_entity()).build()));
    ObjectBuilder::new()
        .schema_type(Type::Object)
        .property("item", any_entity())
        .property("items", items)
        .build()
        .into()
}

/// Full entity shape: `id`, declared fields, `createdAt`, `updatedAt`.
pub fn entity_schema(entity: &EntityDescriptor) -> RefOr<Schema> {
    let mut b = ObjectBuilder::new()
        .schema_type(Type::Object)
        .property(ID_FIELD, uuid_schema())
        .required(ID_FIELD);
    for f in entity.fields() {
        b = b.property(f.name.as_str(), field_schema(f));
        if f.required {
            b = b.required(f.name.as_str());
        }
    }
    b.property(CREATED_AT_FIELD, date_time_schema())
        .property(UPDATED_AT_FIELD, date_time_schema())
        .required(CREATED_AT_FIELD)
        .required(UPDATED_AT_FIELD)
        .build()
        .into()
}

fn user_fields_schema(entity: &EntityDescriptor) -> RefOr<Schema> {
    entity
        .fields()
        .iter()
        .fold(ObjectBuilder::new().schema_type(Type::Object), |b, f| {
            let b = b.property(f.name.as_str(), field_schema(f));
            if f.required {
                b.required(f.name.as_str())
            } else {
                b
            }
        })
        .build()
        .into()
}

/// Create shape: user-supplied fields only.
pub fn create_schema(entity: &EntityDescriptor) -> RefOr<Schema> {
    user_fields_schema(entity)
}

/// Update shape: user-supplied fields only, with the same required set as create.
pub fn update_schema(entity: &EntityDescriptor) -> RefOr<Schema> {
    user_fields_schema(entity)
}

/// Registry of every known entity; produces the always-present catalog entries.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    entities: Vec<EntityDescriptor>,
}

impl SchemaRegistry {
    pub fn new(entities: Vec<EntityDescriptor>) -> Self {
        SchemaRegistry { entities }
    }

    /// Adds an entity; a later registration with the same name replaces the earlier one.
    pub fn register(&mut self, entity: EntityDescriptor) {
        self.entities.retain(|e| e.name() != entity.name());
        self.entities.push(entity);
    }

    pub fn entities(&self) -> &[EntityDescriptor] {
        &self.entities
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDescriptor> {
        self.entities.iter().find(|e| e.name() == name)
    }

    /// `ErrorResponse`, `SuccessResponse` and one shape per entity.
    pub fn catalog(&self) -> BTreeMap<String, RefOr<Schema>> {
        let mut schemas = BTreeMap::new();
        schemas.insert(ERROR_SCHEMA.to_string(), error_schema());
        schemas.insert(SUCCESS_SCHEMA.to_string(), success_schema(&self.entities));
        for e in &self.entities {
            schemas.insert(e.name().to_string(), entity_schema(e));
        }
        schemas
    }
}
