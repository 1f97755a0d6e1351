//! Descriptor validation run once at startup, before any route is bound.

use crate::entity::{EntityDescriptor, SYSTEM_FIELDS};
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;

pub fn validate_entities(entities: &[EntityDescriptor]) -> Result<(), ConfigError> {
    let mut segments: HashSet<&str> = HashSet::new();
    for e in entities {
        if e.name().trim().is_empty() {
            return Err(ConfigError::EmptyEntityName);
        }
        if !segments.insert(e.path_segment()) {
            return Err(ConfigError::DuplicatePathSegment(e.path_segment().to_string()));
        }
        let mut fields: HashSet<&str> = HashSet::new();
        for f in e.fields() {
            if SYSTEM_FIELDS.contains(&f.name.as_str()) {
                return Err(ConfigError::ReservedField {
                    entity: e.name().to_string(),
                    field: f.name.clone(),
                });
            }
            if !fields.insert(f.name.as_str()) {
                return Err(ConfigError::DuplicateField {
                    entity: e.name().to_string(),
                    field: f.name.clone(),
                });
            }
            if let Some(p) = &f.pattern {
                Regex::new(p).map_err(|err| ConfigError::InvalidPattern {
                    entity: e.name().to_string(),
                    field: f.name.clone(),
                    reason: err.to_string(),
                })?;
            }
        }
    }
    Ok(())
}
