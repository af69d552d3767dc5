/// Error types for the CMS service
///
/// This module defines all error types that can occur in the service.
/// Errors are converted to the API's response envelopes:
/// validation failures carry a per-field message map (422), missing
/// resources a `"<Entity> not found"` message (404), and backend faults
/// a contextual `"Error <action> <entity>"` message with detail (500).
use crate::validators::FieldErrors;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::fmt;

/// Result type for CMS service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Request fields violate declared constraints
    Validation(FieldErrors),

    /// Referenced resource is absent; carries the entity display name
    NotFound(&'static str),

    /// Malformed request (unreadable body, bad multipart stream)
    BadRequest(String),

    /// Database operation failed; `context` is the "<action> <entity>"
    /// fragment surfaced to the client
    Database { context: String, message: String },

    /// File store operation failed
    Storage { context: String, message: String },

    /// Anything else unexpected
    Internal(String),
}

impl AppError {
    /// Database fault during "<action> <entity>", e.g. ("creating", "category")
    pub fn database(action: &str, entity: &str, err: sqlx::Error) -> Self {
        AppError::Database {
            context: format!("{} {}", action, entity),
            message: err.to_string(),
        }
    }

    /// File store fault during "<action> <entity>"
    pub fn storage(action: &str, entity: &str, err: file_store::FileStoreError) -> Self {
        AppError::Storage {
            context: format!("{} {}", action, entity),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => write!(f, "Validation failed: {}", errors),
            AppError::NotFound(entity) => write!(f, "{} not found", entity),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Database { context, message } => {
                write!(f, "Database error while {}: {}", context, message)
            }
            AppError::Storage { context, message } => {
                write!(f, "Storage error while {}: {}", context, message)
            }
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database { .. } | AppError::Storage { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(errors) => {
                HttpResponse::build(self.status_code()).json(serde_json::json!({
                    "message": "Validation failed",
                    "errors": errors,
                }))
            }
            AppError::NotFound(entity) => {
                HttpResponse::build(self.status_code()).json(serde_json::json!({
                    "message": format!("{} not found", entity),
                }))
            }
            AppError::BadRequest(msg) => {
                HttpResponse::build(self.status_code()).json(serde_json::json!({
                    "message": msg,
                }))
            }
            AppError::Database { context, message }
            | AppError::Storage { context, message } => {
                HttpResponse::build(self.status_code()).json(serde_json::json!({
                    "message": format!("Error {}", context),
                    "error": message,
                }))
            }
            AppError::Internal(msg) => {
                HttpResponse::build(self.status_code()).json(serde_json::json!({
                    "message": "Internal server error",
                    "error": msg,
                }))
            }
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: &AppError) -> serde_json::Value {
        let resp = err.error_response();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn validation_envelope_carries_field_map() {
        let mut errors = FieldErrors::new();
        errors.add("name", "The name field is required.");
        errors.add("name", "The name has already been taken.");
        errors.add("parent_id", "The selected parent id is invalid.");
        let err = AppError::Validation(errors);

        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(&err).await;
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(
            body["errors"]["name"],
            serde_json::json!([
                "The name field is required.",
                "The name has already been taken."
            ])
        );
        assert_eq!(
            body["errors"]["parent_id"],
            serde_json::json!(["The selected parent id is invalid."])
        );
    }

    #[actix_web::test]
    async fn not_found_envelope_names_entity() {
        let err = AppError::NotFound("Category");

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let body = body_json(&err).await;
        assert_eq!(body["message"], "Category not found");
    }

    #[actix_web::test]
    async fn database_envelope_carries_action_context() {
        let err = AppError::database(
            "creating",
            "category",
            sqlx::Error::PoolTimedOut,
        );

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(&err).await;
        assert_eq!(body["message"], "Error creating category");
        assert!(body["error"].as_str().is_some());
    }

    #[actix_web::test]
    async fn bad_request_envelope() {
        let err = AppError::BadRequest("Invalid request body".to_string());

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = body_json(&err).await;
        assert_eq!(body["message"], "Invalid request body");
    }
}
