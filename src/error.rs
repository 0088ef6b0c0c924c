//! Error types for the caching layer
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
/// Unified error type for the caching layer and its consumers.
///
/// The taxonomy separates three failure families that callers must
/// treat differently:
/// - `UnknownCache` is a programmer/configuration error: the caller
///   referenced a cache name outside the declared set.
/// - `NotFound` means the loader determined the entity does not exist.
///   This is an expected outcome, never cached and never retried.
/// - `Load` is any other loader failure. It is propagated as-is and
///   never cached; retry policy belongs to the caller.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache name is not in the declared set
    #[error("Unknown cache: {0}")]
    UnknownCache(String),

    /// The loader determined the entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The loader failed for a reason other than absence
    #[error("Load failed: {0}")]
    Load(String),

    /// Operation signature could not be turned into a cache key
    #[error("Invalid operation signature: {0}")]
    InvalidSignature(String),

    /// Internal error (e.g. a cached value failed to serialize)
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // An undeclared cache name maps to "not found" at the HTTP
            // boundary, same as a missing entity.
            CacheError::UnknownCache(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CacheError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CacheError::Load(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            CacheError::InvalidSignature(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            CacheError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching layer.
pub type Result<T> = std::result::Result<T, CacheError>;
