//! Marketplace error types with HTTP status code mapping.
//!
//! [`HubError`] is the central error type. Each variant maps to a specific
//! HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2002,
///     "message": "order not found: 0f8f…"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see ranges on [`HubError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status                  |
/// |-----------|---------------------|------------------------------|
/// | 1000–1999 | Validation          | 400 Bad Request              |
/// | 2000–2999 | Not Found/Conflict  | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server              | 500 Internal Server Error    |
/// | 5000–5999 | Auth                | 401 / 403                    |
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Requested order status change is not allowed by the lifecycle.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// The operation needs a completed order.
    #[error("order must be completed to leave a review")]
    OrderNotCompleted,

    /// Uploaded file rejected.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// Service listing not found (or no longer active).
    #[error("service not found: {0}")]
    ServiceNotFound(String),

    /// Order not found.
    #[error("order not found: {0}")]
    OrderNotFound(uuid::Uuid),

    /// Chat message not found.
    #[error("message not found: {0}")]
    MessageNotFound(uuid::Uuid),

    /// Portfolio item not found.
    #[error("portfolio item not found: {0}")]
    PortfolioItemNotFound(uuid::Uuid),

    /// Unique constraint violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Missing or invalid bearer token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated caller may not perform this operation.
    #[error("access denied: {0}")]
    Forbidden(String),
}

impl HubError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidTransition { .. } => 1002,
            Self::OrderNotCompleted => 1003,
            Self::InvalidUpload(_) => 1004,
            Self::ServiceNotFound(_) => 2001,
            Self::OrderNotFound(_) => 2002,
            Self::MessageNotFound(_) => 2003,
            Self::PortfolioItemNotFound(_) => 2005,
            Self::Conflict(_) => 2009,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::Unauthorized(_) => 5001,
            Self::Forbidden(_) => 5003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidTransition { .. }
            | Self::OrderNotCompleted
            | Self::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            Self::ServiceNotFound(_)
            | Self::OrderNotFound(_)
            | Self::MessageNotFound(_)
            | Self::PortfolioItemNotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl From<sqlx::Error> for HubError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err
            && db.is_unique_violation()
        {
            return Self::Conflict(db.message().to_string());
        }
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
