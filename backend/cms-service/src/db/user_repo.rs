use crate::models::User;
use sqlx::PgPool;
use std::collections::HashMap;

/// Fetch users for a set of ids, keyed by id (batched relation load).
/// The CMS only reads this table.
pub async fn find_by_ids(pool: &PgPool, ids: &[i64]) -> Result<HashMap<i64, User>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, created_at, updated_at
        FROM users
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}
