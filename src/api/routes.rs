//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats, get_article, get_article_async, get_comment, get_comment_async, get_user,
    get_user_async, health, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/users/:id", get(get_user))
        .route("/users/:id/async", get(get_user_async))
        .route("/articles/:id", get(get_article))
        .route("/articles/:id/async", get(get_article_async))
        .route("/comments/:id", get(get_comment))
        .route("/comments/:id/async", get(get_comment_async))
        .route("/stats/:cache_name", get(cache_stats))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
