use crate::db::errors::DbError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data, e.g. a required body field is missing
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} '{id}' not found")]
    NotFound { resource: String, id: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::CONFLICT,
                DbError::ProtectedEntity { .. } => StatusCode::CONFLICT,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} '{id}' not found"),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { table, .. } => match table.as_deref() {
                    Some("companies") => "A company with this code already exists".to_string(),
                    _ => "Resource already exists".to_string(),
                },
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
                DbError::ProtectedEntity {
                    operation,
                    entity_type,
                    entity_id,
                    reason,
                } => format!("Cannot {operation} {entity_type} '{entity_id}': {reason}"),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
        }
    }

    /// Build a `BadRequest` naming every required body field that was absent
    pub fn missing_fields(fields: &[&str]) -> Self {
        Error::BadRequest {
            message: format!("Missing required field(s): {}", fields.join(", ")),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        (status, Json(json!({ "message": self.user_message() }))).into_response()
    }
}

/// A body that is not JSON, or whose fields have the wrong types, is the caller's fault
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest {
            message: rejection.body_text(),
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Operation;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::missing_fields(&["code"]).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::NotFound {
                resource: "Company".to_string(),
                id: "apple".to_string()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(Error::Database(DbError::NotFound).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Database(DbError::Other(anyhow::anyhow!("connection reset"))).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::Database(DbError::UniqueViolation {
                constraint: Some("companies_pkey".to_string()),
                table: Some("companies".to_string()),
                message: "duplicate key".to_string(),
            })
            .status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_missing_fields_message() {
        let err = Error::missing_fields(&["name", "description"]);
        assert_eq!(err.user_message(), "Missing required field(s): name, description");
    }

    #[test]
    fn test_internal_errors_do_not_leak_details() {
        let err = Error::Database(DbError::Other(anyhow::anyhow!("password authentication failed for user \"postgres\"")));
        assert_eq!(err.user_message(), "Database error occurred");

        let err = Error::Internal {
            operation: "read /etc/biztime/secret".to_string(),
        };
        assert_eq!(err.user_message(), "Internal server error");
    }

    #[test]
    fn test_protected_entity_message() {
        let err = Error::Database(DbError::ProtectedEntity {
            operation: Operation::Delete,
            reason: "it still has 1 invoice(s)".to_string(),
            entity_type: "company".to_string(),
            entity_id: "apple".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.user_message(), "Cannot delete company 'apple': it still has 1 invoice(s)");
    }
}
