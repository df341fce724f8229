use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{on_fk_violation, ApiError};

#[derive(Debug, Clone, FromRow)]
pub struct Step {
    pub id: Uuid,
    pub description: String,
    pub completed: bool,
    pub goal_id: Uuid,
    pub created_at: OffsetDateTime,
}

const COLUMNS: &str = "id, description, completed, goal_id, created_at";

pub async fn insert(
    db: &PgPool,
    goal_id: Uuid,
    description: &str,
    completed: bool,
) -> Result<Step, ApiError> {
    sqlx::query_as::<_, Step>(
        r#"
        INSERT INTO steps (description, completed, goal_id)
        VALUES ($1, $2, $3)
        RETURNING id, description, completed, goal_id, created_at
        "#,
    )
    .bind(description)
    .bind(completed)
    .bind(goal_id)
    .fetch_one(db)
    .await
    .map_err(|e| on_fk_violation(e, "Goal not found"))
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Step>, sqlx::Error> {
    sqlx::query_as::<_, Step>(&format!("SELECT {COLUMNS} FROM steps WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Steps of a goal in creation order — the order guru's positional update
/// relies on.
pub async fn by_goal(db: &PgPool, goal_id: Uuid) -> Result<Vec<Step>, sqlx::Error> {
    sqlx::query_as::<_, Step>(&format!(
        "SELECT {COLUMNS} FROM steps WHERE goal_id = $1 ORDER BY created_at, id"
    ))
    .bind(goal_id)
    .fetch_all(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    description: &str,
    completed: bool,
) -> Result<Option<Step>, sqlx::Error> {
    sqlx::query_as::<_, Step>(
        r#"
        UPDATE steps SET description = $2, completed = $3
        WHERE id = $1
        RETURNING id, description, completed, goal_id, created_at
        "#,
    )
    .bind(id)
    .bind(description)
    .bind(completed)
    .fetch_optional(db)
    .await
}

/// The goal_id foreign key means removing the row is the whole detach; there
/// is no second document to fix up.
pub async fn delete(db: &PgPool, id: Uuid) -> Result<Option<Step>, sqlx::Error> {
    sqlx::query_as::<_, Step>(
        "DELETE FROM steps WHERE id = $1 RETURNING id, description, completed, goal_id, created_at",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}
