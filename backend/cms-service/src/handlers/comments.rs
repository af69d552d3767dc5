/// Comment handlers - HTTP endpoints for comment operations
use crate::db::comment_repo;
use crate::error::{AppError, Result};
use crate::requests::CommentPayload;
use crate::resources::CommentResource;
use crate::validators;
use actix_web::{web, HttpRequest, HttpResponse};
use sqlx::PgPool;

/// List all comments
pub async fn list_comments(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let comments = comment_repo::all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Error fetching comments");
        AppError::database("retrieving", "comments", e)
    })?;

    Ok(HttpResponse::Ok().json(CommentResource::collection(&comments)))
}

/// Create a new comment
pub async fn create_comment(
    pool: web::Data<PgPool>,
    req: HttpRequest,
    body: web::Payload,
) -> Result<HttpResponse> {
    let payload = CommentPayload::parse(&req, body).await?;

    let data = match validators::validate_comment(pool.get_ref(), &payload).await {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!(error = %err, "Comment validation failed");
            return Err(err);
        }
    };

    let comment = comment_repo::create(pool.get_ref(), &data).await.map_err(|e| {
        tracing::error!(error = %e, "Error creating comment");
        AppError::database("creating", "comment", e)
    })?;

    Ok(HttpResponse::Created().json(CommentResource::new(&comment)))
}

/// Get a comment by ID
pub async fn get_comment(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse> {
    let comment = comment_repo::find(pool.get_ref(), *path)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, comment_id = *path, "Error fetching comment");
            AppError::database("retrieving", "comment", e)
        })?
        .ok_or(AppError::NotFound("Comment"))?;

    Ok(HttpResponse::Ok().json(CommentResource::new(&comment)))
}

/// Update a comment
pub async fn update_comment(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    req: HttpRequest,
    body: web::Payload,
) -> Result<HttpResponse> {
    let id = *path;
    comment_repo::find(pool.get_ref(), id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, comment_id = id, "Error fetching comment");
            AppError::database("updating", "comment", e)
        })?
        .ok_or(AppError::NotFound("Comment"))?;

    let payload = CommentPayload::parse(&req, body).await?;
    let data = match validators::validate_comment(pool.get_ref(), &payload).await {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!(error = %err, comment_id = id, "Comment validation failed");
            return Err(err);
        }
    };

    let comment = comment_repo::update(pool.get_ref(), id, &data)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, comment_id = id, "Error updating comment");
            AppError::database("updating", "comment", e)
        })?;

    Ok(HttpResponse::Ok().json(CommentResource::new(&comment)))
}

/// Delete a comment
pub async fn delete_comment(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse> {
    let id = *path;
    comment_repo::find(pool.get_ref(), id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, comment_id = id, "Error fetching comment");
            AppError::database("deleting", "comment", e)
        })?
        .ok_or(AppError::NotFound("Comment"))?;

    comment_repo::delete(pool.get_ref(), id).await.map_err(|e| {
        tracing::error!(error = %e, comment_id = id, "Error deleting comment");
        AppError::database("deleting", "comment", e)
    })?;

    Ok(HttpResponse::NoContent().finish())
}
