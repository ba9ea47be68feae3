//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Error Flow in the Market API                           │
//! │                                                                         │
//! │  ValidationError (market-core) ──┐                                      │
//! │  DbError         (market-db) ────┼──► ApiError ──► IntoResponse         │
//! │  CreateOrderError (market-db) ───┘       │                              │
//! │                                          ▼                              │
//! │               { "code": "VALIDATION_ERROR", "message": "..." }          │
//! │               with the matching HTTP status                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status mapping: validation → 400, auth → 401, not-found → 404,
//! database/internal (incl. order-number exhaustion) → 500. Internal detail
//! is logged, never sent to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use market_core::ValidationError;
use market_db::{CreateOrderError, DbError};

/// API error returned to HTTP clients.
///
/// ## Serialization
/// ```json
/// { "code": "NOT_FOUND", "message": "Order not found: MKT-..." }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Missing or invalid credentials (401)
    Unauthorized,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    fn status(&self) -> StatusCode {
        match self.code {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field } => {
                ApiError::validation(format!("{} already exists", field))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!("Database error: {}", other);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts order-creation failures to API errors.
impl From<CreateOrderError> for ApiError {
    fn from(err: CreateOrderError) -> Self {
        match err {
            CreateOrderError::MissingProducts(ids) => {
                ApiError::validation(format!("Products not found or inactive: {:?}", ids))
            }
            CreateOrderError::NumberExhausted { attempts } => {
                tracing::error!(attempts, "Order number generation exhausted");
                ApiError::internal("Could not generate a unique order number, please retry")
            }
            CreateOrderError::Db(db) => db.into(),
        }
    }
}

/// Result type for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::not_found("Order", "X").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::validation("bad").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized("no").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::internal("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_products_is_validation() {
        let err: ApiError = CreateOrderError::MissingProducts(vec![3, 7]).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("[3, 7]"));
    }

    #[test]
    fn test_exhaustion_is_internal() {
        let err: ApiError = CreateOrderError::NumberExhausted { attempts: 5 }.into();
        assert_eq!(err.code, ErrorCode::Internal);
    }
}
