use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

/// User record in the database. password_hash is NULL for accounts created
/// through Google sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing)]
    pub google_id: Option<String>,
    pub profile_image: String,
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, google_id, profile_image, created_at";

impl User {
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
        profile_image: Option<&str>,
    ) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, profile_image)
            VALUES ($1, $2, $3, COALESCE($4, ''))
            RETURNING id, username, email, password_hash, google_id, profile_image, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(profile_image)
        .fetch_one(db)
        .await
        .map_err(map_user_conflict)
    }

    pub async fn create_from_google(
        db: &PgPool,
        username: &str,
        email: &str,
        google_id: &str,
        picture: Option<&str>,
    ) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, google_id, profile_image)
            VALUES ($1, $2, $3, COALESCE($4, ''))
            RETURNING id, username, email, password_hash, google_id, profile_image, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(google_id)
        .bind(picture)
        .fetch_one(db)
        .await
        .map_err(map_user_conflict)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }
}

/// Username/email uniqueness lives in the schema; translate the violation
/// into the API's duplicate messages.
pub(crate) fn map_user_conflict(e: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            let message = match db.constraint() {
                Some("users_username_key") => "Username already exists",
                Some("users_email_key") => "Email already exists",
                _ => "User already exists",
            };
            return ApiError::Conflict(message.into());
        }
    }
    ApiError::Database(e)
}
