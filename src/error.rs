// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::database::DatabaseError;
use crate::services::ServiceError;

/// Per-field validation messages, keyed by the camelCase request field name
pub type FieldErrors = BTreeMap<String, String>;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<FieldErrors>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to the response envelope; `data` is always null on failure
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "code": self.status_code().as_u16(),
            "message": self.message(),
            "data": Value::Null,
        });

        if let ApiError::ValidationError {
            field_errors: Some(field_errors),
            ..
        } = self
        {
            response["errors"] = json!(field_errors);
        }

        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<FieldErrors>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(entity) => ApiError::not_found(format!("{} not found", entity)),
            ServiceError::InvalidParent(entity) => {
                ApiError::bad_request(format!("{} not found or inaccessible", entity))
            }
            ServiceError::InvalidRegistrationKey => ApiError::bad_request("invalid registration key"),
            ServiceError::DuplicateName => ApiError::bad_request("user name already taken"),
            ServiceError::InvalidCredentials => ApiError::unauthorized("invalid user name or password"),
            ServiceError::Unauthorized(msg) => ApiError::unauthorized(msg),
            ServiceError::Validation(field_errors) => {
                ApiError::validation_error("validation failed", Some(field_errors))
            }
            ServiceError::Database(err) => err.into(),
            ServiceError::Content(err) => {
                tracing::error!("Chapter content error: {}", err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            ServiceError::Hash(err) => {
                tracing::error!("Password hashing error: {}", err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            ServiceError::Token(err) => {
                tracing::error!("Token issuing error: {}", err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::UniqueViolation(constraint) => {
                tracing::warn!("Unique constraint violated: {}", constraint);
                ApiError::bad_request("record already exists")
            }
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) => {
                tracing::error!("Database pool timed out");
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
            DatabaseError::Unavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_status_as_code() {
        let body = ApiError::not_found("world view not found").to_json();
        assert_eq!(body["code"], 404);
        assert_eq!(body["message"], "world view not found");
        assert!(body["data"].is_null());
    }

    #[test]
    fn validation_errors_list_fields() {
        let mut fields = FieldErrors::new();
        fields.insert("name".to_string(), "must not be empty".to_string());
        let body = ApiError::validation_error("validation failed", Some(fields)).to_json();
        assert_eq!(body["code"], 400);
        assert_eq!(body["errors"]["name"], "must not be empty");
    }

    #[test]
    fn cross_owner_and_invalid_parent_map_to_distinct_statuses() {
        let missing: ApiError = ServiceError::NotFound("world view").into();
        let parent: ApiError = ServiceError::InvalidParent("world view").into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(parent.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn sqlx_detail_never_reaches_the_body() {
        let err: ApiError = DatabaseError::Sqlx(sqlx::Error::Protocol("secret detail".into())).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_json().to_string().contains("secret detail"));
    }
}
