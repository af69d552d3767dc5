/// Post handlers - HTTP endpoints for post operations
use crate::db::post_repo;
use crate::error::{AppError, Result};
use crate::requests::{PostPayload, UploadedFile};
use crate::resources::PostResource;
use crate::validators;
use actix_web::{web, HttpRequest, HttpResponse};
use file_store::{FileStore, SharedFileStore};
use sqlx::PgPool;

/// Namespace post images are stored under on the public tier
const IMAGE_NAMESPACE: &str = "posts";

/// List all posts with category and user eager-loaded
pub async fn list_posts(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let posts = post_repo::all_with_relations(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Error fetching posts");
            AppError::database("retrieving", "posts", e)
        })?;

    Ok(HttpResponse::Ok().json(PostResource::collection(&posts)))
}

/// Create a new post
pub async fn create_post(
    pool: web::Data<PgPool>,
    store: web::Data<SharedFileStore>,
    req: HttpRequest,
    body: web::Payload,
) -> Result<HttpResponse> {
    let payload = PostPayload::parse(&req, body).await?;
    tracing::debug!(title = payload.title.as_deref(), "post creation request");

    let data = match validators::validate_post(pool.get_ref(), &payload).await {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!(error = %err, "Post validation failed");
            return Err(err);
        }
    };

    let thumbnail_path =
        store_image(store.get_ref(), payload.image_thumbnail.as_ref(), "creating").await?;
    let content_path = match store_image(store.get_ref(), payload.image_content.as_ref(), "creating").await
    {
        Ok(path) => path,
        Err(err) => {
            cleanup_stored(store.get_ref(), thumbnail_path.as_deref()).await;
            return Err(err);
        }
    };

    let post = match post_repo::create(
        pool.get_ref(),
        &data,
        thumbnail_path.as_deref(),
        content_path.as_deref(),
    )
    .await
    {
        Ok(post) => post,
        Err(e) => {
            tracing::error!(error = %e, "Error creating post");
            // Row write failed after the file writes; remove the orphans.
            cleanup_stored(store.get_ref(), thumbnail_path.as_deref()).await;
            cleanup_stored(store.get_ref(), content_path.as_deref()).await;
            return Err(AppError::database("creating", "post", e));
        }
    };

    Ok(HttpResponse::Created().json(PostResource::bare(&post)))
}

/// Get a post by ID with category, user and comments eager-loaded
pub async fn get_post(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse> {
    let post = post_repo::find_with_relations(pool.get_ref(), *path)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, post_id = *path, "Error fetching post");
            AppError::database("retrieving", "post", e)
        })?
        .ok_or(AppError::NotFound("Post"))?;

    Ok(HttpResponse::Ok().json(PostResource::new(&post)))
}

/// Get posts filtered by category, 404 when nothing matches
pub async fn get_posts_by_category(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let posts = post_repo::where_category_with_relations(pool.get_ref(), *path)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, category_id = *path, "Error fetching posts by category");
            AppError::database("retrieving", "posts", e)
        })?;

    if posts.is_empty() {
        return Err(AppError::NotFound("Posts"));
    }

    Ok(HttpResponse::Ok().json(PostResource::collection(&posts)))
}

/// Update a post
pub async fn update_post(
    pool: web::Data<PgPool>,
    store: web::Data<SharedFileStore>,
    path: web::Path<i64>,
    req: HttpRequest,
    body: web::Payload,
) -> Result<HttpResponse> {
    let id = *path;
    let existing = post_repo::find(pool.get_ref(), id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, post_id = id, "Error fetching post");
            AppError::database("updating", "post", e)
        })?
        .ok_or(AppError::NotFound("Post"))?;

    let payload = PostPayload::parse(&req, body).await?;
    let data = match validators::validate_post(pool.get_ref(), &payload).await {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!(error = %err, post_id = id, "Post validation failed");
            return Err(err);
        }
    };

    // Each image field is replaced independently: delete the previous
    // stored file, then store the new upload.
    let thumbnail_path = replace_image(
        store.get_ref(),
        payload.image_thumbnail.as_ref(),
        existing.image_thumbnail.as_deref(),
    )
    .await?;
    let content_path = match replace_image(
        store.get_ref(),
        payload.image_content.as_ref(),
        existing.image_content.as_deref(),
    )
    .await
    {
        Ok(path) => path,
        Err(err) => {
            cleanup_stored(store.get_ref(), thumbnail_path.as_deref()).await;
            return Err(err);
        }
    };

    let post = match post_repo::update(
        pool.get_ref(),
        id,
        &data,
        thumbnail_path.as_deref(),
        content_path.as_deref(),
    )
    .await
    {
        Ok(post) => post,
        Err(e) => {
            tracing::error!(error = %e, post_id = id, "Error updating post");
            cleanup_stored(store.get_ref(), thumbnail_path.as_deref()).await;
            cleanup_stored(store.get_ref(), content_path.as_deref()).await;
            return Err(AppError::database("updating", "post", e));
        }
    };

    Ok(HttpResponse::Ok().json(PostResource::bare(&post)))
}

/// Delete a post and its stored images
pub async fn delete_post(
    pool: web::Data<PgPool>,
    store: web::Data<SharedFileStore>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = *path;
    let existing = post_repo::find(pool.get_ref(), id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, post_id = id, "Error fetching post");
            AppError::database("deleting", "post", e)
        })?
        .ok_or(AppError::NotFound("Post"))?;

    for image in [
        existing.image_thumbnail.as_deref(),
        existing.image_content.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        match store.delete(image).await {
            Ok(false) => tracing::warn!(path = image, "post image already absent"),
            Ok(true) => {}
            Err(e) => tracing::warn!(error = %e, path = image, "post image delete failed"),
        }
    }

    post_repo::delete(pool.get_ref(), id).await.map_err(|e| {
        tracing::error!(error = %e, post_id = id, "Error deleting post");
        AppError::database("deleting", "post", e)
    })?;

    Ok(HttpResponse::NoContent().finish())
}

/// Store one optional uploaded image, mapping faults to the 500
/// envelope for `action`
async fn store_image(
    store: &SharedFileStore,
    file: Option<&UploadedFile>,
    action: &str,
) -> Result<Option<String>> {
    match file {
        Some(file) => store
            .store(IMAGE_NAMESPACE, &file.file_name, &file.data)
            .await
            .map(Some)
            .map_err(|e| {
                tracing::error!(error = %e, "Error storing post image");
                AppError::storage(action, "post", e)
            }),
        None => Ok(None),
    }
}

/// Delete-then-store for one image field on update. Returns the new
/// stored path, or `None` when no new file was uploaded.
async fn replace_image(
    store: &SharedFileStore,
    file: Option<&UploadedFile>,
    previous: Option<&str>,
) -> Result<Option<String>> {
    if file.is_some() {
        if let Some(old) = previous {
            match store.delete(old).await {
                Ok(false) => tracing::warn!(path = old, "previous post image already absent"),
                Ok(true) => {}
                Err(e) => tracing::warn!(error = %e, path = old, "previous post image delete failed"),
            }
        }
    }
    store_image(store, file, "updating").await
}

/// Best-effort removal of a file stored earlier in a request whose row
/// write did not land
async fn cleanup_stored(store: &SharedFileStore, path: Option<&str>) {
    if let Some(path) = path {
        if let Err(e) = store.delete(path).await {
            tracing::warn!(error = %e, path, "orphaned image cleanup failed");
        }
    }
}
