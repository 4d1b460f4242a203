//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache layer and its HTTP surface.
///
/// Tier failures (`ConnectionUnavailable`, `Encoding`, `Decoding`) are
/// absorbed by the [`CacheManager`](crate::cache::CacheManager) and never
/// reach its callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Remote store unreachable or timed out
    #[error("Connection unavailable: {0}")]
    ConnectionUnavailable(String),

    /// Value could not be serialized for storage
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Stored bytes could not be turned back into a value
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Call arguments have no stable textual representation
    #[error("Unsupported argument: {0}")]
    UnsupportedArgument(String),

    /// Key not found in any tier
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::UnsupportedArgument(_) => {
                StatusCode::BAD_REQUEST
            }
            CacheError::ConnectionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Encoding(_) | CacheError::Decoding(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CacheError::NotFound("k".into()), StatusCode::NOT_FOUND),
            (CacheError::InvalidRequest("k".into()), StatusCode::BAD_REQUEST),
            (
                CacheError::ConnectionUnavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CacheError::Encoding("bad".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_display_includes_detail() {
        let err = CacheError::UnsupportedArgument("map key must be a string".into());
        assert!(err.to_string().contains("map key must be a string"));
    }
}
