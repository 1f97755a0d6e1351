//! Entity and field descriptors derived once per record type at startup.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Key of the system-managed identifier in every entity shape.
pub const ID_FIELD: &str = "id";
/// Key of the system-managed creation timestamp.
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Key of the system-managed modification timestamp.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Keys the store manages; clients never set them through create or update bodies.
pub const SYSTEM_FIELDS: [&str; 3] = [ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD];

/// Semantic type of a declared field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Uuid,
    DateTime,
    Integer,
    Number,
    Boolean,
}

impl FieldType {
    /// PostgreSQL column type used for storage and for casts on bound text parameters.
    pub fn pg_type(self) -> &'static str {
        match self {
            FieldType::String => "text",
            FieldType::Uuid => "uuid",
            FieldType::DateTime => "timestamptz",
            FieldType::Integer => "bigint",
            FieldType::Number => "double precision",
            FieldType::Boolean => "boolean",
        }
    }

    /// Format implied by the type alone, used when the field declares none.
    pub fn implied_format(self) -> Option<&'static str> {
        match self {
            FieldType::Uuid => Some("uuid"),
            FieldType::DateTime => Some("date-time"),
            _ => None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// One user-supplied field of an entity. Describes shape and constraints only; never persisted itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub pattern: Option<String>,
}

impl FieldDescriptor {
    /// Required field of the given type with no constraints.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        FieldDescriptor {
            name: name.into(),
            field_type,
            format: None,
            required: true,
            min_length: None,
            max_length: None,
            pattern: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Declared format, falling back to the one implied by the type.
    pub fn effective_format(&self) -> Option<&str> {
        self.format
            .as_deref()
            .or_else(|| self.field_type.implied_format())
    }
}

/// Lowercase plural path segment: `lowercase(name) + "s"`. No irregular plurals.
pub fn pluralize(name: &str) -> String {
    format!("{}s", name.to_lowercase())
}

/// Immutable description of an entity: name, derived path segment and ordered user fields.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityDescriptor {
    name: String,
    path_segment: String,
    fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        let name = name.into();
        let path_segment = pluralize(&name);
        EntityDescriptor {
            name,
            path_segment,
            fields,
        }
    }

    /// Entity name as declared, e.g. `User`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased name used in human-readable text, e.g. `user`.
    pub fn lower_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Plural path segment, e.g. `users`. Also the table name.
    pub fn path_segment(&self) -> &str {
        &self.path_segment
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Documentation tag: the entity name with a trailing `s`, e.g. `Users`.
    pub fn tag(&self) -> String {
        format!("{}s", self.name)
    }

    /// `/{plural}`
    pub fn collection_path(&self) -> String {
        format!("/{}", self.path_segment)
    }

    /// `/{plural}/{id}`
    pub fn item_path(&self) -> String {
        format!("/{}/{{{}}}", self.path_segment, ID_FIELD)
    }
}

/// A record type exposed through generated CRUD routes.
///
/// Serialized form is a JSON object holding `id`, `createdAt`, `updatedAt` and every
/// field returned by [`Entity::fields`], keyed by the same names.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const NAME: &'static str;

    /// User-supplied fields in declaration order; excludes the system-managed keys.
    fn fields() -> Vec<FieldDescriptor>;

    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::new(Self::NAME, Self::fields())
    }
}
