//! Repositories
//!
//! The data-access collaborators that supply real values on cache misses.
//! Each lookup routes through the resolver instead of hitting its table
//! directly: the table read becomes the loader, and the result is memoized
//! under the repository's named cache.
//!
//! Every repository exposes the lookup in both call shapes. The `get`
//! variant presents a blocking signature; `get_async` presents the
//! suspending signature whose underlying call carries a trailing completion
//! token. Both shapes share one key space, so a value loaded through one is
//! a hit through the other.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::cache::{CacheResolver, OperationSignature};
use crate::error::{CacheError, Result};
use crate::models::{Article, ArticleId, Comment, User, UserId};

// == Tables ==
/// In-memory stand-in for the users table.
#[derive(Debug)]
pub struct UserTable {
    rows: HashMap<UserId, User>,
}

impl UserTable {
    /// Builds the table with its seed rows.
    pub fn seeded() -> Self {
        let rows = [
            User {
                id: 1,
                name: "alice".to_string(),
            },
            User {
                id: 2,
                name: "bob".to_string(),
            },
            User {
                id: 3,
                name: "carol".to_string(),
            },
        ]
        .into_iter()
        .map(|user| (user.id, user))
        .collect();
        Self { rows }
    }

    pub fn find_by_id(&self, id: UserId) -> Option<User> {
        self.rows.get(&id).cloned()
    }
}

/// In-memory stand-in for the articles table.
#[derive(Debug)]
pub struct ArticleTable {
    rows: HashMap<ArticleId, Article>,
}

impl ArticleTable {
    /// Builds the table with its seed rows.
    pub fn seeded() -> Self {
        let rows = [
            Article {
                id: 1,
                title: "On cache staleness".to_string(),
                author_id: 1,
            },
            Article {
                id: 2,
                title: "Keys and continuations".to_string(),
                author_id: 2,
            },
        ]
        .into_iter()
        .map(|article| (article.id, article))
        .collect();
        Self { rows }
    }

    pub fn find_by_id(&self, id: ArticleId) -> Option<Article> {
        self.rows.get(&id).cloned()
    }
}

// == User Repository ==
/// Cached access to user records.
#[derive(Clone)]
pub struct UserRepository {
    table: Arc<UserTable>,
    resolver: Arc<CacheResolver>,
}

impl UserRepository {
    pub fn new(resolver: Arc<CacheResolver>) -> Self {
        Self {
            table: Arc::new(UserTable::seeded()),
            resolver,
        }
    }

    /// Fetches a user by id through the `user` cache (blocking shape).
    pub async fn get(&self, id: UserId) -> Result<User> {
        let table = self.table.clone();
        self.resolver
            .resolve("user", OperationSignature::blocking([id]), move || async move {
                info!("fetch user({}) from table", id);
                table
                    .find_by_id(id)
                    .ok_or_else(|| CacheError::NotFound(format!("user:{}", id)))
            })
            .await
    }

    /// Fetches a user by id through the `user` cache (suspending shape).
    pub async fn get_async(&self, id: UserId) -> Result<User> {
        let table = self.table.clone();
        self.resolver
            .resolve("user", OperationSignature::suspending([id]), move || async move {
                info!("fetch user({}) from table", id);
                table
                    .find_by_id(id)
                    .ok_or_else(|| CacheError::NotFound(format!("user:{}", id)))
            })
            .await
    }
}

// == Article Repository ==
/// Cached access to article records.
#[derive(Clone)]
pub struct ArticleRepository {
    table: Arc<ArticleTable>,
    resolver: Arc<CacheResolver>,
}

impl ArticleRepository {
    pub fn new(resolver: Arc<CacheResolver>) -> Self {
        Self {
            table: Arc::new(ArticleTable::seeded()),
            resolver,
        }
    }

    /// Fetches an article by id through the `article` cache (blocking shape).
    pub async fn get(&self, id: ArticleId) -> Result<Article> {
        let table = self.table.clone();
        self.resolver
            .resolve(
                "article",
                OperationSignature::blocking([id]),
                move || async move {
                    info!("fetch article({}) from table", id);
                    table
                        .find_by_id(id)
                        .ok_or_else(|| CacheError::NotFound(format!("article:{}", id)))
                },
            )
            .await
    }

    /// Fetches an article by id through the `article` cache (suspending shape).
    pub async fn get_async(&self, id: ArticleId) -> Result<Article> {
        let table = self.table.clone();
        self.resolver
            .resolve(
                "article",
                OperationSignature::suspending([id]),
                move || async move {
                    info!("fetch article({}) from table", id);
                    table
                        .find_by_id(id)
                        .ok_or_else(|| CacheError::NotFound(format!("article:{}", id)))
                },
            )
            .await
    }
}

// == Comment Repository ==
/// Cached access to comment records. Comments have no backing table; the
/// loader fabricates the record from the id, so every id resolves.
#[derive(Clone)]
pub struct CommentRepository {
    resolver: Arc<CacheResolver>,
}

impl CommentRepository {
    pub fn new(resolver: Arc<CacheResolver>) -> Self {
        Self { resolver }
    }

    /// Fetches a comment by id through the `comment` cache (blocking shape).
    pub async fn get(&self, id: &str) -> Result<Comment> {
        let id = id.to_string();
        self.resolver
            .resolve(
                "comment",
                OperationSignature::blocking([id.clone()]),
                move || async move {
                    info!("fetch comment({}) from source", id);
                    Ok(Comment {
                        body: format!("{} comment", id),
                        id,
                        user_id: 1,
                    })
                },
            )
            .await
    }

    /// Fetches a comment by id through the `comment` cache (suspending shape).
    pub async fn get_async(&self, id: &str) -> Result<Comment> {
        let id = id.to_string();
        self.resolver
            .resolve(
                "comment",
                OperationSignature::suspending([id.clone()]),
                move || async move {
                    info!("fetch comment({}) from source", id);
                    Ok(Comment {
                        body: format!("{} comment", id),
                        id,
                        user_id: 1,
                    })
                },
            )
            .await
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CachePolicy, CacheRegistry};

    fn resolver() -> Arc<CacheResolver> {
        let registry = CacheRegistry::new(vec![
            ("user".to_string(), CachePolicy::new().max_entries(100)),
            ("article".to_string(), CachePolicy::new().max_entries(100)),
            ("comment".to_string(), CachePolicy::new().max_entries(100)),
        ]);
        Arc::new(CacheResolver::new(Arc::new(registry)))
    }

    #[tokio::test]
    async fn test_user_lookup_is_cached() {
        let resolver = resolver();
        let repo = UserRepository::new(resolver.clone());

        let first = repo.get(1).await.unwrap();
        let second = repo.get(1).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.name, "alice");

        let snap = resolver.stats("user").await.unwrap();
        assert_eq!(snap.miss_count, 1);
        assert_eq!(snap.hit_count, 1);
        assert_eq!(snap.load_success_count, 1);
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let repo = UserRepository::new(resolver());
        let result = repo.get(99).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_sync_and_async_lookups_share_one_cache() {
        let resolver = resolver();
        let repo = UserRepository::new(resolver.clone());

        let first = repo.get(2).await.unwrap();
        let second = repo.get_async(2).await.unwrap();
        assert_eq!(first, second);

        // One load, one hit: the suspending shape derived the same key.
        let snap = resolver.stats("user").await.unwrap();
        assert_eq!(snap.load_success_count, 1);
        assert_eq!(snap.hit_count, 1);
    }

    #[tokio::test]
    async fn test_article_lookup() {
        let repo = ArticleRepository::new(resolver());
        let article = repo.get_async(1).await.unwrap();
        assert_eq!(article.title, "On cache staleness");
        assert_eq!(article.author_id, 1);
    }

    #[tokio::test]
    async fn test_comment_is_fabricated_and_cached() {
        let resolver = resolver();
        let repo = CommentRepository::new(resolver.clone());

        let comment = repo.get("c42").await.unwrap();
        assert_eq!(comment.body, "c42 comment");
        assert_eq!(comment.user_id, 1);

        let again = repo.get_async("c42").await.unwrap();
        assert_eq!(again, comment);

        let snap = resolver.stats("comment").await.unwrap();
        assert_eq!(snap.load_success_count, 1);
        assert_eq!(snap.hit_count, 1);
    }
}
