use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo::{map_user_conflict, User};
use crate::error::ApiError;

/// Fields of a profile update; None leaves the column untouched.
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub profile_image: Option<String>,
}

pub async fn list(db: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, google_id, profile_image, created_at
        FROM users
        ORDER BY created_at, id
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn update(db: &PgPool, id: Uuid, upd: UserUpdate) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET username = COALESCE($2, username),
            email = COALESCE($3, email),
            password_hash = COALESCE($4, password_hash),
            profile_image = COALESCE($5, profile_image)
        WHERE id = $1
        RETURNING id, username, email, password_hash, google_id, profile_image, created_at
        "#,
    )
    .bind(id)
    .bind(upd.username)
    .bind(upd.email)
    .bind(upd.password_hash)
    .bind(upd.profile_image)
    .fetch_optional(db)
    .await
    .map_err(map_user_conflict)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        DELETE FROM users WHERE id = $1
        RETURNING id, username, email, password_hash, google_id, profile_image, created_at
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}
