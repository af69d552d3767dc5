/// Category handlers - HTTP endpoints for category operations
use crate::db::category_repo;
use crate::error::{AppError, Result};
use crate::requests::CategoryPayload;
use crate::resources::CategoryResource;
use crate::validators;
use actix_web::{web, HttpRequest, HttpResponse};
use file_store::{FileStore, SharedFileStore};
use sqlx::PgPool;

/// Namespace category images are stored under on the public tier
const IMAGE_NAMESPACE: &str = "categories";

/// List all categories
pub async fn list_categories(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let categories = category_repo::all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Error fetching categories");
        AppError::database("retrieving", "categories", e)
    })?;

    Ok(HttpResponse::Ok().json(CategoryResource::collection(&categories)))
}

/// Create a new category
pub async fn create_category(
    pool: web::Data<PgPool>,
    store: web::Data<SharedFileStore>,
    req: HttpRequest,
    body: web::Payload,
) -> Result<HttpResponse> {
    let payload = CategoryPayload::parse(&req, body).await?;
    tracing::debug!(name = payload.name.as_deref(), "category creation request");

    let data = match validators::validate_category(pool.get_ref(), &payload, None).await {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!(error = %err, "Category validation failed");
            return Err(err);
        }
    };

    let image_path = match payload.image.as_ref() {
        Some(file) => Some(
            store
                .store(IMAGE_NAMESPACE, &file.file_name, &file.data)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Error storing category image");
                    AppError::storage("creating", "category", e)
                })?,
        ),
        None => None,
    };

    let category = match category_repo::create(pool.get_ref(), &data, image_path.as_deref()).await
    {
        Ok(category) => category,
        Err(e) => {
            tracing::error!(error = %e, "Error creating category");
            // Row write failed after the file write; remove the orphan.
            if let Some(path) = image_path.as_deref() {
                if let Err(cleanup) = store.delete(path).await {
                    tracing::warn!(error = %cleanup, path, "orphaned image cleanup failed");
                }
            }
            return Err(AppError::database("creating", "category", e));
        }
    };

    Ok(HttpResponse::Created().json(CategoryResource::new(&category)))
}

/// Get a category by ID
pub async fn get_category(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse> {
    let category = category_repo::find(pool.get_ref(), *path)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, category_id = *path, "Error fetching category");
            AppError::database("retrieving", "category", e)
        })?
        .ok_or(AppError::NotFound("Category"))?;

    Ok(HttpResponse::Ok().json(CategoryResource::new(&category)))
}

/// Update a category
pub async fn update_category(
    pool: web::Data<PgPool>,
    store: web::Data<SharedFileStore>,
    path: web::Path<i64>,
    req: HttpRequest,
    body: web::Payload,
) -> Result<HttpResponse> {
    let id = *path;
    let existing = category_repo::find(pool.get_ref(), id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, category_id = id, "Error fetching category");
            AppError::database("updating", "category", e)
        })?
        .ok_or(AppError::NotFound("Category"))?;

    let payload = CategoryPayload::parse(&req, body).await?;
    let data = match validators::validate_category(pool.get_ref(), &payload, Some(id)).await {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!(error = %err, category_id = id, "Category validation failed");
            return Err(err);
        }
    };

    // A new upload replaces the stored file: delete the old one first,
    // then store the new one.
    let mut image_path = None;
    if let Some(file) = payload.image.as_ref() {
        if let Some(old) = existing.image.as_deref() {
            match store.delete(old).await {
                Ok(false) => tracing::warn!(path = old, "previous category image already absent"),
                Ok(true) => {}
                Err(e) => tracing::warn!(error = %e, path = old, "previous category image delete failed"),
            }
        }
        image_path = Some(
            store
                .store(IMAGE_NAMESPACE, &file.file_name, &file.data)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, category_id = id, "Error storing category image");
                    AppError::storage("updating", "category", e)
                })?,
        );
    }

    let category = match category_repo::update(pool.get_ref(), id, &data, image_path.as_deref())
        .await
    {
        Ok(category) => category,
        Err(e) => {
            tracing::error!(error = %e, category_id = id, "Error updating category");
            if let Some(path) = image_path.as_deref() {
                if let Err(cleanup) = store.delete(path).await {
                    tracing::warn!(error = %cleanup, path, "orphaned image cleanup failed");
                }
            }
            return Err(AppError::database("updating", "category", e));
        }
    };

    Ok(HttpResponse::Ok().json(CategoryResource::new(&category)))
}

/// Delete a category
///
/// Declared delete policy: child categories and posts are left in
/// place; only the row and its stored image are removed.
pub async fn delete_category(
    pool: web::Data<PgPool>,
    store: web::Data<SharedFileStore>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = *path;
    let existing = category_repo::find(pool.get_ref(), id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, category_id = id, "Error fetching category");
            AppError::database("deleting", "category", e)
        })?
        .ok_or(AppError::NotFound("Category"))?;

    if let Some(image) = existing.image.as_deref() {
        match store.delete(image).await {
            Ok(false) => tracing::warn!(path = image, "category image already absent"),
            Ok(true) => {}
            Err(e) => tracing::warn!(error = %e, path = image, "category image delete failed"),
        }
    }

    category_repo::delete(pool.get_ref(), id).await.map_err(|e| {
        tracing::error!(error = %e, category_id = id, "Error deleting category");
        AppError::database("deleting", "category", e)
    })?;

    Ok(HttpResponse::NoContent().finish())
}
