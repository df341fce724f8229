use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    goals::{
        dto::{CreateGoalRequest, DeletedGoalResponse, GoalResponse, UpdateGoalRequest},
        repo,
    },
    state::AppState,
};

pub fn goal_routes() -> Router<AppState> {
    Router::new()
        .route("/goals", post(create_goal))
        .route("/goals/sender", get(goals_by_sender))
        .route(
            "/goals/:id",
            get(get_goal).put(update_goal).delete(delete_goal),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateGoalRequest>,
) -> ApiResult<Json<GoalResponse>> {
    let name = match payload.name {
        Some(n) if !n.is_empty() => n,
        _ => return Err(ApiError::Validation("required body not provided".into())),
    };

    let goal = repo::insert(&state.db, user_id, &name).await?;
    info!(goal_id = %goal.id, user_id = %user_id, "goal created");
    Ok(Json(GoalResponse {
        id: goal.id,
        name: goal.name,
        completed: goal.completed,
        creator_id: goal.creator_id,
        steps: vec![],
    }))
}

/// Goals of the authenticated caller, steps included.
#[instrument(skip(state))]
pub async fn goals_by_sender(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<GoalResponse>>> {
    let goals = repo::by_creator(&state.db, user_id).await?;
    Ok(Json(goals.into_iter().map(GoalResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_goal(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GoalResponse>> {
    let goal = repo::with_steps(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Goal not found".into()))?;
    Ok(Json(goal.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_goal(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGoalRequest>,
) -> ApiResult<Json<GoalResponse>> {
    let (name, completed) = match (payload.name, payload.completed) {
        (Some(n), Some(c)) if !n.is_empty() => (n, c),
        _ => return Err(ApiError::Validation("required body not provided".into())),
    };

    repo::update(&state.db, id, &name, completed)
        .await?
        .ok_or_else(|| ApiError::NotFound("Goal not found".into()))?;

    let goal = repo::with_steps(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Goal not found".into()))?;
    Ok(Json(goal.into()))
}

#[instrument(skip(state))]
pub async fn delete_goal(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedGoalResponse>> {
    let goal = repo::with_steps(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Goal not found".into()))?;

    repo::delete(&state.db, id).await?;
    info!(goal_id = %id, "goal deleted");
    Ok(Json(DeletedGoalResponse {
        message: "Goal deleted successfully".into(),
        goal: goal.into(),
    }))
}
