//! API Module
//!
//! HTTP handlers and routing for the demo service.
//!
//! # Endpoints
//! - `GET /users/:id` / `GET /users/:id/async` - Fetch a user (cached)
//! - `GET /articles/:id` / `GET /articles/:id/async` - Fetch an article (cached)
//! - `GET /comments/:id` / `GET /comments/:id/async` - Fetch a comment (cached)
//! - `GET /stats/:cache_name` - Statistics snapshot for a declared cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
