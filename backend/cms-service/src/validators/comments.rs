/// Comment validation
use super::{check_required, is_blank, messages, FieldErrors};
use crate::db::post_repo;
use crate::error::{AppError, Result};
use crate::requests::CommentPayload;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use validator::ValidateEmail;

/// The validated field set persisted for a comment
#[derive(Debug, Clone)]
pub struct CommentData {
    pub post_id: i64,
    pub name: String,
    pub email: String,
    pub content: String,
    pub is_published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
}

fn check_fields(payload: &CommentPayload) -> FieldErrors {
    let mut errors = payload.type_errors.clone();

    check_required("name", payload.name.as_deref(), &mut errors);

    check_required("email", payload.email.as_deref(), &mut errors);
    if let Some(email) = payload.email.as_deref() {
        if !is_blank(Some(email)) && !email.validate_email() {
            errors.add("email", messages::email("email"));
        }
    }

    check_required("content", payload.content.as_deref(), &mut errors);

    if payload.post_id.is_none() {
        errors.add("post_id", messages::required("post_id"));
    }

    errors
}

/// Validate a comment payload; `post_id` must resolve to a real post.
pub async fn validate_comment(pool: &PgPool, payload: &CommentPayload) -> Result<CommentData> {
    let mut errors = check_fields(payload);

    if let Some(post_id) = payload.post_id {
        let post_exists = post_repo::exists(pool, post_id)
            .await
            .map_err(|e| AppError::database("validating", "comment", e))?;
        if !post_exists {
            errors.add("post_id", messages::invalid_selection("post_id"));
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(CommentData {
        post_id: payload.post_id.unwrap_or_default(),
        name: payload.name.clone().unwrap_or_default(),
        email: payload.email.clone().unwrap_or_default(),
        content: payload.content.clone().unwrap_or_default(),
        is_published: payload.is_published,
        published_at: payload.published_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_fields_are_required() {
        let errors = check_fields(&CommentPayload::default());

        assert_eq!(errors.messages("name"), &["The name field is required."]);
        assert_eq!(errors.messages("email"), &["The email field is required."]);
        assert_eq!(
            errors.messages("content"),
            &["The content field is required."]
        );
        assert_eq!(
            errors.messages("post_id"),
            &["The post id field is required."]
        );
    }

    #[test]
    fn invalid_email_syntax_is_rejected() {
        let payload = CommentPayload {
            post_id: Some(1),
            name: Some("Ana".to_string()),
            email: Some("not-an-email".to_string()),
            content: Some("Nice post".to_string()),
            ..CommentPayload::default()
        };

        let errors = check_fields(&payload);
        assert_eq!(
            errors.messages("email"),
            &["The email field must be a valid email address."]
        );
    }

    #[test]
    fn valid_comment_fields_pass() {
        let payload = CommentPayload {
            post_id: Some(1),
            name: Some("Ana".to_string()),
            email: Some("ana@example.com".to_string()),
            content: Some("Nice post".to_string()),
            is_published: Some(true),
            ..CommentPayload::default()
        };

        assert!(check_fields(&payload).is_empty());
    }
}
