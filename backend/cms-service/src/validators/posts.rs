/// Post validation
use super::{check_image, check_max_chars, check_required, messages, FieldErrors};
use crate::db::category_repo;
use crate::error::{AppError, Result};
use crate::requests::PostPayload;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// The validated field set persisted for a post
#[derive(Debug, Clone)]
pub struct PostData {
    pub title: String,
    pub content: String,
    pub category_id: i64,
    pub user_id: Option<i64>,
    pub is_published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
    pub author: String,
}

fn check_fields(payload: &PostPayload) -> FieldErrors {
    let mut errors = payload.type_errors.clone();

    check_required("title", payload.title.as_deref(), &mut errors);
    check_max_chars("title", payload.title.as_deref(), 255, &mut errors);

    check_required("content", payload.content.as_deref(), &mut errors);

    if payload.category_id.is_none() {
        errors.add("category_id", messages::required("category_id"));
    }

    check_required("author", payload.author.as_deref(), &mut errors);
    check_max_chars("author", payload.author.as_deref(), 255, &mut errors);

    if let Some(image) = &payload.image_thumbnail {
        check_image("image_thumbnail", image, &mut errors);
    }
    if let Some(image) = &payload.image_content {
        check_image("image_content", image, &mut errors);
    }

    errors
}

/// Validate a post payload. `user_id` is a soft reference and is never
/// probed for existence; `category_id` must resolve to a real category.
pub async fn validate_post(pool: &PgPool, payload: &PostPayload) -> Result<PostData> {
    let mut errors = check_fields(payload);

    if let Some(category_id) = payload.category_id {
        let category_exists = category_repo::exists(pool, category_id)
            .await
            .map_err(|e| AppError::database("validating", "post", e))?;
        if !category_exists {
            errors.add("category_id", messages::invalid_selection("category_id"));
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(PostData {
        title: payload.title.clone().unwrap_or_default(),
        content: payload.content.clone().unwrap_or_default(),
        category_id: payload.category_id.unwrap_or_default(),
        user_id: payload.user_id,
        is_published: payload.is_published,
        published_at: payload.published_at,
        author: payload.author.clone().unwrap_or_default(),
    })
}
