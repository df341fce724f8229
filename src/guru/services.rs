use sqlx::PgPool;
use uuid::Uuid;

use crate::guru::ai::GoalPlan;
use crate::steps::repo::Step;

/// Persist a freshly generated plan as a new goal plus its steps, atomically.
pub async fn persist_new_plan(
    db: &PgPool,
    creator_id: Uuid,
    plan: &GoalPlan,
) -> Result<(Uuid, Vec<Step>), sqlx::Error> {
    let mut tx = db.begin().await?;

    let goal_id: Uuid =
        sqlx::query_scalar("INSERT INTO goals (name, creator_id) VALUES ($1, $2) RETURNING id")
            .bind(&plan.name)
            .bind(creator_id)
            .fetch_one(&mut *tx)
            .await?;

    for description in &plan.steps {
        sqlx::query("INSERT INTO steps (description, goal_id) VALUES ($1, $2)")
            .bind(description)
            .bind(goal_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    let steps = crate::steps::repo::by_goal(db, goal_id).await?;
    Ok((goal_id, steps))
}

/// Apply a revised plan to an existing goal: rename it, rewrite existing
/// steps positionally, append whatever is left over. One transaction, so a
/// failure leaves the goal untouched.
pub async fn apply_plan_to_goal(
    db: &PgPool,
    goal_id: Uuid,
    plan: &GoalPlan,
) -> Result<Vec<Step>, sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query("UPDATE goals SET name = $2 WHERE id = $1")
        .bind(goal_id)
        .bind(&plan.name)
        .execute(&mut *tx)
        .await?;

    let existing: Vec<Uuid> = sqlx::query_scalar(
        "SELECT id FROM steps WHERE goal_id = $1 ORDER BY created_at, id",
    )
    .bind(goal_id)
    .fetch_all(&mut *tx)
    .await?;

    for (i, description) in plan.steps.iter().enumerate() {
        match existing.get(i) {
            Some(step_id) => {
                sqlx::query("UPDATE steps SET description = $2 WHERE id = $1")
                    .bind(step_id)
                    .bind(description)
                    .execute(&mut *tx)
                    .await?;
            }
            None => {
                sqlx::query("INSERT INTO steps (description, goal_id) VALUES ($1, $2)")
                    .bind(description)
                    .bind(goal_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }
    }

    tx.commit().await?;

    crate::steps::repo::by_goal(db, goal_id).await
}
