use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::steps::dto::StepView;

#[derive(Debug, Clone, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub name: String,
    pub completed: bool,
    pub creator_id: Uuid,
    pub created_at: OffsetDateTime,
}

/// Goal joined with its steps (creation order) in one query, mirroring how
/// the feed folds comments into posts.
#[derive(Debug, FromRow)]
pub struct GoalWithSteps {
    pub id: Uuid,
    pub name: String,
    pub completed: bool,
    pub creator_id: Uuid,
    pub steps: Json<Vec<StepView>>,
}

const WITH_STEPS_SELECT: &str = r#"
SELECT g.id,
       g.name,
       g.completed,
       g.creator_id,
       COALESCE((
           SELECT json_agg(
                      json_build_object(
                          'id', s.id,
                          'description', s.description,
                          'completed', s.completed,
                          'goalId', s.goal_id
                      )
                      ORDER BY s.created_at, s.id
                  )
           FROM steps s
           WHERE s.goal_id = g.id
       ), '[]'::json) AS steps
FROM goals g
"#;

pub async fn insert(db: &PgPool, creator_id: Uuid, name: &str) -> Result<Goal, sqlx::Error> {
    sqlx::query_as::<_, Goal>(
        r#"
        INSERT INTO goals (name, creator_id)
        VALUES ($1, $2)
        RETURNING id, name, completed, creator_id, created_at
        "#,
    )
    .bind(name)
    .bind(creator_id)
    .fetch_one(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Goal>, sqlx::Error> {
    sqlx::query_as::<_, Goal>(
        "SELECT id, name, completed, creator_id, created_at FROM goals WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn with_steps(db: &PgPool, id: Uuid) -> Result<Option<GoalWithSteps>, sqlx::Error> {
    sqlx::query_as::<_, GoalWithSteps>(&format!("{WITH_STEPS_SELECT} WHERE g.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn by_creator(db: &PgPool, creator_id: Uuid) -> Result<Vec<GoalWithSteps>, sqlx::Error> {
    sqlx::query_as::<_, GoalWithSteps>(&format!(
        "{WITH_STEPS_SELECT} WHERE g.creator_id = $1 ORDER BY g.created_at, g.id"
    ))
    .bind(creator_id)
    .fetch_all(db)
    .await
}

/// Update name/completed; completing a goal marks its remaining steps done in
/// the same transaction.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    name: &str,
    completed: bool,
) -> Result<Option<Goal>, sqlx::Error> {
    let mut tx = db.begin().await?;

    let goal = sqlx::query_as::<_, Goal>(
        r#"
        UPDATE goals SET name = $2, completed = $3
        WHERE id = $1
        RETURNING id, name, completed, creator_id, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(completed)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(goal) = goal else {
        tx.rollback().await?;
        return Ok(None);
    };

    if completed {
        sqlx::query("UPDATE steps SET completed = true WHERE goal_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(Some(goal))
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM goals WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
