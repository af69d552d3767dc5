use crate::models::Category;
use crate::validators::CategoryData;
use sqlx::PgPool;
use std::collections::HashMap;

/// List all categories ordered by id
pub async fn all(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, description, image, is_published, parent_id, created_at, updated_at
        FROM categories
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Find a category by ID
pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, description, image, is_published, parent_id, created_at, updated_at
        FROM categories
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Fetch categories for a set of ids, keyed by id (batched relation load)
pub async fn find_by_ids(
    pool: &PgPool,
    ids: &[i64],
) -> Result<HashMap<i64, Category>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let categories = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, description, image, is_published, parent_id, created_at, updated_at
        FROM categories
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(categories.into_iter().map(|c| (c.id, c)).collect())
}

/// Create a category. `image` is the stored file path when a cover was
/// uploaded.
pub async fn create(
    pool: &PgPool,
    data: &CategoryData,
    image: Option<&str>,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, description, image, is_published, parent_id)
        VALUES ($1, $2, $3, COALESCE($4, FALSE), $5)
        RETURNING id, name, description, image, is_published, parent_id, created_at, updated_at
        "#,
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(image)
    .bind(data.is_published)
    .bind(data.parent_id)
    .fetch_one(pool)
    .await
}

/// Update a category. Optional fields that were not submitted keep
/// their stored value; `image` only changes when a new upload replaced
/// the old file.
pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &CategoryData,
    image: Option<&str>,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
        SET name = $1,
            description = COALESCE($2, description),
            image = COALESCE($3, image),
            is_published = COALESCE($4, is_published),
            parent_id = COALESCE($5, parent_id),
            updated_at = NOW()
        WHERE id = $6
        RETURNING id, name, description, image, is_published, parent_id, created_at, updated_at
        "#,
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(image)
    .bind(data.is_published)
    .bind(data.parent_id)
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Delete a category row. Returns the number of rows removed.
pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Whether a category row exists
pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Uniqueness probe for `name`, optionally excluding the row being
/// updated
pub async fn name_exists(
    pool: &PgPool,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM categories
            WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(name)
    .bind(exclude_id)
    .fetch_one(pool)
    .await
}

/// Whether `candidate` sits anywhere in the subtree rooted at
/// `ancestor`. Used to keep `parent_id` updates acyclic.
pub async fn is_descendant(
    pool: &PgPool,
    candidate: i64,
    ancestor: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"
        WITH RECURSIVE descendants AS (
            SELECT id FROM categories WHERE parent_id = $1
            UNION ALL
            SELECT c.id FROM categories c
            JOIN descendants d ON c.parent_id = d.id
        )
        SELECT EXISTS(SELECT 1 FROM descendants WHERE id = $2)
        "#,
    )
    .bind(ancestor)
    .bind(candidate)
    .fetch_one(pool)
    .await
}
