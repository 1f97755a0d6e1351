//! Request validation from field descriptors.

use crate::entity::{EntityDescriptor, FieldDescriptor, FieldType};
use crate::error::AppError;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Pattern accepted for fields with the `email` format.
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body: every required field present and non-null, every present field well-formed.
    pub fn validate(body: &Map<String, Value>, entity: &EntityDescriptor) -> Result<(), AppError> {
        for field in entity.fields() {
            match body.get(&field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(AppError::BadRequest(format!("{} is required", field.name)));
                }
                Some(v) => validate_field(field, v)?,
                None => {}
            }
        }
        Ok(())
    }

    /// Validate only the fields present in body (for updates). Required is not enforced for missing fields.
    pub fn validate_partial(body: &Map<String, Value>, entity: &EntityDescriptor) -> Result<(), AppError> {
        for (key, v) in body {
            if let Some(field) = entity.field(key) {
                if v.is_null() && field.required {
                    return Err(AppError::BadRequest(format!("{} must not be null", key)));
                }
                validate_field(field, v)?;
            }
        }
        Ok(())
    }
}

/// Keep only keys declared as user fields; system-managed and unknown keys are dropped.
pub fn user_fields(body: Map<String, Value>, entity: &EntityDescriptor) -> Map<String, Value> {
    body.into_iter()
        .filter(|(k, _)| entity.field(k).is_some())
        .collect()
}

fn validate_field(field: &FieldDescriptor, v: &Value) -> Result<(), AppError> {
    if v.is_null() {
        return Ok(());
    }
    validate_type(field, v)?;
    let name = &field.name;
    if let Some(s) = v.as_str() {
        let len = s.chars().count();
        if let Some(min) = field.min_length {
            if len < min {
                return Err(AppError::BadRequest(format!(
                    "{} must be at least {} characters",
                    name, min
                )));
            }
        }
        if let Some(max) = field.max_length {
            if len > max {
                return Err(AppError::BadRequest(format!(
                    "{} must be at most {} characters",
                    name, max
                )));
            }
        }
        if let Some(ref pattern) = field.pattern {
            let re = Regex::new(pattern)
                .map_err(|_| AppError::BadRequest(format!("invalid pattern for {}", name)))?;
            if !re.is_match(s) {
                return Err(AppError::BadRequest(format!("{} does not match required pattern", name)));
            }
        }
        if let Some(format) = field.effective_format() {
            validate_format(name, s, format)?;
        }
    }
    Ok(())
}

fn validate_type(field: &FieldDescriptor, v: &Value) -> Result<(), AppError> {
    let ok = match field.field_type {
        FieldType::String | FieldType::Uuid | FieldType::DateTime => v.is_string(),
        FieldType::Integer => v.is_i64() || v.is_u64(),
        FieldType::Number => v.is_number(),
        FieldType::Boolean => v.is_boolean(),
    };
    if ok {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "{} must be of type {:?}",
            field.name, field.field_type
        )))
    }
}

fn validate_format(name: &str, s: &str, format: &str) -> Result<(), AppError> {
    match format.to_lowercase().as_str() {
        "email" => {
            let valid = email_regex().map(|re| re.is_match(s)).unwrap_or(false);
            if !valid {
                return Err(AppError::BadRequest(format!("{} must be a valid email", name)));
            }
        }
        "uuid" => {
            if uuid::Uuid::parse_str(s).is_err() {
                return Err(AppError::BadRequest(format!("{} must be a valid UUID", name)));
            }
        }
        "date-time" => {
            if chrono::DateTime::parse_from_rfc3339(s).is_err() {
                return Err(AppError::BadRequest(format!("{} must be an RFC 3339 date-time", name)));
            }
        }
        _ => {}
    }
    Ok(())
}
