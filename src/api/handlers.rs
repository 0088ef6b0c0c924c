//! API Handlers
//!
//! HTTP request handlers for each endpoint. The entity handlers never talk
//! to the cache directly; they go through the repositories, which route
//! every lookup through the cache-aside resolver.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheRegistry, CacheResolver, StatsSnapshot};
use crate::error::Result;
use crate::models::{Article, Comment, HealthResponse, User};
use crate::repos::{ArticleRepository, CommentRepository, UserRepository};

/// Application state shared across all handlers.
///
/// The registry is constructed once at startup and handed in here; nothing
/// else in the process holds cache state.
#[derive(Clone)]
pub struct AppState {
    /// The resolver backing every repository
    pub resolver: Arc<CacheResolver>,
    pub users: UserRepository,
    pub articles: ArticleRepository,
    pub comments: CommentRepository,
}

impl AppState {
    /// Wires the repositories to a resolver over the given registry.
    pub fn new(registry: Arc<CacheRegistry>) -> Self {
        let resolver = Arc::new(CacheResolver::new(registry));
        Self {
            users: UserRepository::new(resolver.clone()),
            articles: ArticleRepository::new(resolver.clone()),
            comments: CommentRepository::new(resolver.clone()),
            resolver,
        }
    }
}

/// Handler for GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<User>> {
    state.users.get(id).await.map(Json)
}

/// Handler for GET /users/:id/async
///
/// Same lookup through the suspending call shape; shares the `user` cache
/// with the blocking endpoint.
pub async fn get_user_async(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<User>> {
    state.users.get_async(id).await.map(Json)
}

/// Handler for GET /articles/:id
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Article>> {
    state.articles.get(id).await.map(Json)
}

/// Handler for GET /articles/:id/async
pub async fn get_article_async(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Article>> {
    state.articles.get_async(id).await.map(Json)
}

/// Handler for GET /comments/:id
pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Comment>> {
    state.comments.get(&id).await.map(Json)
}

/// Handler for GET /comments/:id/async
pub async fn get_comment_async(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Comment>> {
    state.comments.get_async(&id).await.map(Json)
}

/// Handler for GET /stats/:cache_name
///
/// Returns the statistics snapshot for one declared cache. An undeclared
/// name is a 404.
pub async fn cache_stats(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
) -> Result<Json<StatsSnapshot>> {
    state.resolver.stats(&cache_name).await.map(Json)
}

/// Handler for GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
