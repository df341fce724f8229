use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{on_fk_violation, on_unique_violation, ApiError};

/// One like per (user, post) pair is the table's composite primary key, so
/// the double-like race is closed by the store, not a pre-check.
pub async fn add(db: &PgPool, user_id: Uuid, post_id: Uuid) -> Result<(), ApiError> {
    sqlx::query("INSERT INTO likes (user_id, post_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(post_id)
        .execute(db)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                on_unique_violation(e, "Like already exists")
            } else {
                on_fk_violation(e, "Post not found")
            }
        })?;
    Ok(())
}

pub async fn remove(db: &PgPool, user_id: Uuid, post_id: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
        .bind(user_id)
        .bind(post_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
