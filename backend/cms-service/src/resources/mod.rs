/// API resource shapes
///
/// Pure mappings from entities (plus whatever relations the handler
/// eager-loaded) to the stable JSON shapes clients consume. Relations
/// that were not loaded serialize as `null`; nothing here ever touches
/// the database.
use crate::models::{Category, Comment, Post, PostWithRelations, User};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CategoryResource {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_published: bool,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryResource {
    pub fn new(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone(),
            image: category.image.clone(),
            is_published: category.is_published,
            parent_id: category.parent_id,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }

    pub fn collection(categories: &[Category]) -> Vec<Self> {
        categories.iter().map(Self::new).collect()
    }
}

#[derive(Debug, Serialize)]
pub struct UserResource {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserResource {
    pub fn new(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResource {
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

impl CommentResource {
    pub fn new(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            name: comment.name.clone(),
            email: comment.email.clone(),
            content: comment.content.clone(),
            is_published: comment.is_published,
            published_at: comment.published_at,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }

    pub fn collection(comments: &[Comment]) -> Vec<Self> {
        comments.iter().map(Self::new).collect()
    }
}

#[derive(Debug, Serialize)]
pub struct PostResource {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_thumbnail: Option<String>,
    pub image_content: Option<String>,
    pub category_id: i64,
    pub category: Option<CategoryResource>,
    pub user_id: Option<i64>,
    pub user: Option<UserResource>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub author: String,
    pub comments_count: Option<i64>,
    pub comments: Option<Vec<CommentResource>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResource {
    pub fn new(loaded: &PostWithRelations) -> Self {
        let post = &loaded.post;
        Self {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            image_thumbnail: post.image_thumbnail.clone(),
            image_content: post.image_content.clone(),
            category_id: post.category_id,
            category: loaded.category.as_ref().map(CategoryResource::new),
            user_id: post.user_id,
            user: loaded.user.as_ref().map(UserResource::new),
            is_published: post.is_published,
            published_at: post.published_at,
            author: post.author.clone(),
            comments_count: loaded.comments.as_ref().map(|c| c.len() as i64),
            comments: loaded
                .comments
                .as_ref()
                .map(|c| CommentResource::collection(c)),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }

    /// Serialize a bare post without any loaded relations
    pub fn bare(post: &Post) -> Self {
        Self::new(&PostWithRelations {
            post: post.clone(),
            category: None,
            user: None,
            comments: None,
        })
    }

    pub fn collection(loaded: &[PostWithRelations]) -> Vec<Self> {
        loaded.iter().map(Self::new).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn category() -> Category {
        Category {
            id: 1,
            name: "Tech".to_string(),
            description: None,
            image: Some("categories/abc.png".to_string()),
            is_published: true,
            parent_id: None,
            created_at: at(1_700_000_000),
            updated_at: at(1_700_000_000),
        }
    }

    fn post() -> Post {
        Post {
            id: 7,
            title: "Hello".to_string(),
            content: "Body".to_string(),
            image_thumbnail: None,
            image_content: None,
            category_id: 1,
            user_id: Some(3),
            is_published: false,
            published_at: None,
            author: "Ana".to_string(),
            created_at: at(1_700_000_100),
            updated_at: at(1_700_000_100),
        }
    }

    fn comment() -> Comment {
        Comment {
            id: 11,
            post_id: 7,
            name: "Bo".to_string(),
            email: "bo@example.com".to_string(),
            content: "Nice".to_string(),
            is_published: true,
            published_at: None,
            created_at: at(1_700_000_200),
            updated_at: at(1_700_000_200),
        }
    }

    #[test]
    fn post_shape_has_all_keys_with_null_unloaded_relations() {
        let value = serde_json::to_value(PostResource::bare(&post())).unwrap();

        let object = value.as_object().unwrap();
        for key in [
            "id",
            "title",
            "content",
            "image_thumbnail",
            "image_content",
            "category_id",
            "category",
            "user_id",
            "user",
            "is_published",
            "published_at",
            "author",
            "comments_count",
            "comments",
            "created_at",
            "updated_at",
        ] {
            assert!(object.contains_key(key), "missing key {}", key);
        }

        assert_eq!(value["category"], serde_json::Value::Null);
        assert_eq!(value["user"], serde_json::Value::Null);
        assert_eq!(value["comments"], serde_json::Value::Null);
        assert_eq!(value["comments_count"], serde_json::Value::Null);
        assert_eq!(value["category_id"], 1);
        assert_eq!(value["user_id"], 3);
    }

    #[test]
    fn post_shape_with_loaded_relations() {
        let loaded = PostWithRelations {
            post: post(),
            category: Some(category()),
            user: None,
            comments: Some(vec![comment()]),
        };

        let value = serde_json::to_value(PostResource::new(&loaded)).unwrap();
        assert_eq!(value["category"]["name"], "Tech");
        assert_eq!(value["comments_count"], 1);
        assert_eq!(value["comments"][0]["content"], "Nice");
        assert_eq!(value["user"], serde_json::Value::Null);
    }

    #[test]
    fn loaded_empty_comments_serialize_as_empty_list_with_zero_count() {
        let loaded = PostWithRelations {
            post: post(),
            category: None,
            user: None,
            comments: Some(vec![]),
        };

        let value = serde_json::to_value(PostResource::new(&loaded)).unwrap();
        assert_eq!(value["comments"], serde_json::json!([]));
        assert_eq!(value["comments_count"], 0);
    }

    #[test]
    fn category_resource_keeps_stored_image_path() {
        let value = serde_json::to_value(CategoryResource::new(&category())).unwrap();
        assert_eq!(value["image"], "categories/abc.png");
        assert_eq!(value["is_published"], true);
        assert_eq!(value["parent_id"], serde_json::Value::Null);
    }

    #[test]
    fn comment_resource_shape() {
        let value = serde_json::to_value(CommentResource::new(&comment())).unwrap();
        assert_eq!(value["post_id"], 7);
        assert_eq!(value["email"], "bo@example.com");
        assert_eq!(value["published_at"], serde_json::Value::Null);
    }
}
