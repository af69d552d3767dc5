use crate::models::Comment;
use crate::validators::CommentData;
use sqlx::PgPool;

const COLUMNS: &str =
    "id, post_id, name, email, content, is_published, published_at, created_at, updated_at";

/// List all comments ordered by id
pub async fn all(pool: &PgPool) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!("SELECT {} FROM comments ORDER BY id", COLUMNS))
        .fetch_all(pool)
        .await
}

/// Find a comment by ID
pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!("SELECT {} FROM comments WHERE id = $1", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Comments attached to one post, oldest first
pub async fn for_post(pool: &PgPool, post_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!(
        "SELECT {} FROM comments WHERE post_id = $1 ORDER BY id",
        COLUMNS
    ))
    .bind(post_id)
    .fetch_all(pool)
    .await
}

/// Create a comment
pub async fn create(pool: &PgPool, data: &CommentData) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!(
        r#"
        INSERT INTO comments (post_id, name, email, content, is_published, published_at)
        VALUES ($1, $2, $3, $4, COALESCE($5, FALSE), $6)
        RETURNING {}
        "#,
        COLUMNS
    ))
    .bind(data.post_id)
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.content)
    .bind(data.is_published)
    .bind(data.published_at)
    .fetch_one(pool)
    .await
}

/// Update a comment. Optional fields that were not submitted keep
/// their stored value.
pub async fn update(pool: &PgPool, id: i64, data: &CommentData) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!(
        r#"
        UPDATE comments
        SET post_id = $1,
            name = $2,
            email = $3,
            content = $4,
            is_published = COALESCE($5, is_published),
            published_at = COALESCE($6, published_at),
            updated_at = NOW()
        WHERE id = $7
        RETURNING {}
        "#,
        COLUMNS
    ))
    .bind(data.post_id)
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.content)
    .bind(data.is_published)
    .bind(data.published_at)
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Delete a comment row. Returns the number of rows removed.
pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
