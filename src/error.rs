//! Typed errors and HTTP mapping.

use crate::entity::EntityDescriptor;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("entity name must not be empty")]
    EmptyEntityName,
    #[error("duplicate path segment: {0}")]
    DuplicatePathSegment(String),
    #[error("duplicate field '{field}' in entity {entity}")]
    DuplicateField { entity: String, field: String },
    #[error("field '{field}' in entity {entity} collides with a system-managed key")]
    ReservedField { entity: String, field: String },
    #[error("invalid pattern for {entity}.{field}: {reason}")]
    InvalidPattern {
        entity: String,
        field: String,
        reason: String,
    },
    #[error("environment: {0}")]
    Env(String),
}

/// Failure reported by a persistence adapter.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record matches the identifier, including identifiers that are not valid UUIDs.
    #[error("record not found")]
    NotFound,
    #[error("database: {0}")]
    Db(sqlx::Error),
    #[error("serialization: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Db(other),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Store failure on a collection operation: always an internal error.
    pub fn from_store(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }

    /// Store failure on an id-scoped operation: `NotFound` becomes 404 naming the entity.
    pub fn from_scoped_store(err: StoreError, entity: &EntityDescriptor) -> Self {
        match err {
            StoreError::NotFound => {
                AppError::NotFound(format!("The {} was not found.", entity.lower_name()))
            }
            other => AppError::from_store(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

/// JSON error payload: `{error: <category>, message: <detail>}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ErrorBody {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ErrorBody::new(status, self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FieldDescriptor;

    #[test]
    fn error_body_uses_canonical_reason() {
        let body = ErrorBody::new(StatusCode::NOT_FOUND, "gone");
        assert_eq!(body.error, "Not Found");
        let body = ErrorBody::new(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(body.error, "Internal Server Error");
        let body = ErrorBody::new(StatusCode::BAD_REQUEST, "bad");
        assert_eq!(body.error, "Bad Request");
        assert_eq!(AppError::Unauthorized("no token".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("no".into()).status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn scoped_not_found_names_entity() {
        let user = EntityDescriptor::new("User", vec![FieldDescriptor::string("name")]);
        let err = AppError::from_scoped_store(StoreError::NotFound, &user);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "The user was not found.");

        let err = AppError::from_store(StoreError::NotFound);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn row_not_found_maps_to_store_not_found() {
        assert!(matches!(StoreError::from(sqlx::Error::RowNotFound), StoreError::NotFound));
    }
}
