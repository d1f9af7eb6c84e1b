//! Directory error types with HTTP status code mapping.
//!
//! [`DirectoryError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "event not found: 7f9c...",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges below).
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
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request              |
/// | 2000–2999 | State/Not Found   | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server            | 500 Internal Server Error    |
/// | 4000–4999 | Lifecycle         | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Event with the given ID was not found in the live table.
    #[error("event not found: {0}")]
    EventNotFound(uuid::Uuid),

    /// Community with the given ID was not found.
    #[error("community not found: {0}")]
    CommunityNotFound(uuid::Uuid),

    /// Duplicate candidate with the given ID was not found.
    #[error("duplicate candidate not found: {0}")]
    CandidateNotFound(uuid::Uuid),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested status change is not a legal lifecycle transition.
    #[error("invalid transition from '{from}' to '{to}'")]
    InvalidTransition {
        /// Status the event currently holds.
        from: String,
        /// Status the caller asked for.
        to: String,
    },

    /// A concurrent writer got there first; the guarded write matched
    /// zero rows.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence layer failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DirectoryError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::EventNotFound(_) => 2001,
            Self::CommunityNotFound(_) => 2002,
            Self::CandidateNotFound(_) => 2003,
            Self::Conflict(_) => 2100,
            Self::Internal(_) => 3000,
            Self::Storage(_) => 3001,
            Self::InvalidTransition { .. } => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::EventNotFound(_) | Self::CommunityNotFound(_) | Self::CandidateNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for DirectoryError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl IntoResponse for DirectoryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
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

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = DirectoryError::EventNotFound(uuid::Uuid::new_v4());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2001);
    }

    #[test]
    fn conflict_maps_to_409() {
        let err = DirectoryError::Conflict("candidate already resolved".to_string());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), 2100);
    }

    #[test]
    fn invalid_transition_maps_to_422() {
        let err = DirectoryError::InvalidTransition {
            from: "pending".to_string(),
            to: "cancelled".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), 4001);
        assert!(err.to_string().contains("pending"));
        assert!(err.to_string().contains("cancelled"));
    }

    #[test]
    fn storage_maps_to_500() {
        let err = DirectoryError::Storage("connection refused".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), 3001);
    }
}
