//! Domain entities
//!
//! The records the repositories fetch and the caching layer memoizes.

use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type ArticleId = u64;

/// A user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

/// An article record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub author_id: UserId,
}

/// A comment record. Comment ids are free-form strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub user_id: UserId,
}
