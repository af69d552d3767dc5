/// Data models for the CMS service
///
/// This module defines structures for:
/// - Category: hierarchical grouping of posts, optional cover image
/// - Post: authored content with thumbnail/body images
/// - Comment: guest feedback attached to a post
/// - User: read-only collaborator referenced by posts
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ========================================
// Category
// ========================================

/// Category database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Stored file path on the public disk, when a cover image was uploaded
    pub image: Option<String>,
    pub is_published: bool,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ========================================
// Post
// ========================================

/// Post database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_thumbnail: Option<String>,
    pub image_content: Option<String>,
    pub category_id: i64,
    pub user_id: Option<i64>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post plus whatever relations the handler eager-loaded for it
#[derive(Debug, Clone)]
pub struct PostWithRelations {
    pub post: Post,
    pub category: Option<Category>,
    pub user: Option<User>,
    /// `None` when comments were not eager-loaded, `Some` (possibly
    /// empty) when they were
    pub comments: Option<Vec<Comment>>,
}

// ========================================
// Comment
// ========================================

/// Comment database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub name: String,
    pub email: String,
    pub content: String,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ========================================
// User
// ========================================

/// User database entity. The CMS never writes this table; rows are
/// only read to serialize the post author relation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
