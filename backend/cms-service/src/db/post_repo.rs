use crate::db::{category_repo, comment_repo, user_repo};
use crate::models::{Post, PostWithRelations};
use crate::validators::PostData;
use sqlx::PgPool;

const COLUMNS: &str = "id, title, content, image_thumbnail, image_content, category_id, \
                       user_id, is_published, published_at, author, created_at, updated_at";

/// List all posts ordered by id
pub async fn all(pool: &PgPool) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!("SELECT {} FROM posts ORDER BY id", COLUMNS))
        .fetch_all(pool)
        .await
}

/// Find a post by ID
pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!("SELECT {} FROM posts WHERE id = $1", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Posts belonging to one category, ordered by id
pub async fn where_category(pool: &PgPool, category_id: i64) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!(
        "SELECT {} FROM posts WHERE category_id = $1 ORDER BY id",
        COLUMNS
    ))
    .bind(category_id)
    .fetch_all(pool)
    .await
}

/// Whether a post row exists
pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Create a post. The image arguments are stored file paths from the
/// public tier.
pub async fn create(
    pool: &PgPool,
    data: &PostData,
    image_thumbnail: Option<&str>,
    image_content: Option<&str>,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        INSERT INTO posts
            (title, content, image_thumbnail, image_content, category_id,
             user_id, is_published, published_at, author)
        VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, FALSE), $8, $9)
        RETURNING {}
        "#,
        COLUMNS
    ))
    .bind(&data.title)
    .bind(&data.content)
    .bind(image_thumbnail)
    .bind(image_content)
    .bind(data.category_id)
    .bind(data.user_id)
    .bind(data.is_published)
    .bind(data.published_at)
    .bind(&data.author)
    .fetch_one(pool)
    .await
}

/// Update a post. Optional fields that were not submitted keep their
/// stored value; each image path only changes when that upload was
/// replaced.
pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &PostData,
    image_thumbnail: Option<&str>,
    image_content: Option<&str>,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        UPDATE posts
        SET title = $1,
            content = $2,
            image_thumbnail = COALESCE($3, image_thumbnail),
            image_content = COALESCE($4, image_content),
            category_id = $5,
            user_id = COALESCE($6, user_id),
            is_published = COALESCE($7, is_published),
            published_at = COALESCE($8, published_at),
            author = $9,
            updated_at = NOW()
        WHERE id = $10
        RETURNING {}
        "#,
        COLUMNS
    ))
    .bind(&data.title)
    .bind(&data.content)
    .bind(image_thumbnail)
    .bind(image_content)
    .bind(data.category_id)
    .bind(data.user_id)
    .bind(data.is_published)
    .bind(data.published_at)
    .bind(&data.author)
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Delete a post row. Returns the number of rows removed.
pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

// ============================================
// Relation-aware reads
// ============================================

/// All posts with `category` and `user` eager-loaded (comments left
/// unloaded)
pub async fn all_with_relations(pool: &PgPool) -> Result<Vec<PostWithRelations>, sqlx::Error> {
    let posts = all(pool).await?;
    attach_relations(pool, posts).await
}

/// Posts for one category with `category` and `user` eager-loaded
pub async fn where_category_with_relations(
    pool: &PgPool,
    category_id: i64,
) -> Result<Vec<PostWithRelations>, sqlx::Error> {
    let posts = where_category(pool, category_id).await?;
    attach_relations(pool, posts).await
}

/// One post with `category`, `user` and `comments` eager-loaded
pub async fn find_with_relations(
    pool: &PgPool,
    id: i64,
) -> Result<Option<PostWithRelations>, sqlx::Error> {
    let Some(post) = find(pool, id).await? else {
        return Ok(None);
    };

    let mut loaded = attach_relations(pool, vec![post]).await?;
    let mut entry = loaded.remove(0);
    entry.comments = Some(comment_repo::for_post(pool, id).await?);

    Ok(Some(entry))
}

/// Batch-load the belongs-to relations for a page of posts
async fn attach_relations(
    pool: &PgPool,
    posts: Vec<Post>,
) -> Result<Vec<PostWithRelations>, sqlx::Error> {
    let mut category_ids: Vec<i64> = posts.iter().map(|p| p.category_id).collect();
    category_ids.sort_unstable();
    category_ids.dedup();

    let mut user_ids: Vec<i64> = posts.iter().filter_map(|p| p.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let categories = category_repo::find_by_ids(pool, &category_ids).await?;
    let users = user_repo::find_by_ids(pool, &user_ids).await?;

    Ok(posts
        .into_iter()
        .map(|post| {
            let category = categories.get(&post.category_id).cloned();
            let user = post.user_id.and_then(|id| users.get(&id).cloned());
            PostWithRelations {
                post,
                category,
                user,
                comments: None,
            }
        })
        .collect())
}
