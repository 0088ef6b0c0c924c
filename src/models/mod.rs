//! Data models for the demo service
//!
//! Domain entities served by the repositories, plus the DTOs used for
//! HTTP response bodies.

pub mod entities;
pub mod responses;

// Re-export commonly used types
pub use entities::{Article, ArticleId, Comment, User, UserId};
pub use responses::{ErrorResponse, HealthResponse};
