use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
    steps::{
        dto::{CreateStepRequest, DeletedStepResponse, StepView, UpdateStepRequest},
        repo,
    },
};

pub fn step_routes() -> Router<AppState> {
    Router::new()
        .route("/steps", post(create_step))
        .route(
            "/steps/:id",
            get(get_step).put(update_step).delete(delete_step),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_step(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Json(payload): Json<CreateStepRequest>,
) -> ApiResult<Json<StepView>> {
    let (goal_id, description) = match (payload.goal_id, payload.description) {
        (Some(g), Some(d)) if !d.is_empty() => (g, d),
        _ => return Err(ApiError::Validation("required body not provided".into())),
    };

    let step = repo::insert(&state.db, goal_id, &description, payload.completed).await?;
    Ok(Json(step.into()))
}

#[instrument(skip(state))]
pub async fn get_step(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StepView>> {
    let step = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Step not found".into()))?;
    Ok(Json(step.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_step(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStepRequest>,
) -> ApiResult<Json<StepView>> {
    let (description, completed) = match (payload.description, payload.completed) {
        (Some(d), Some(c)) if !d.is_empty() => (d, c),
        _ => return Err(ApiError::Validation("required body not provided".into())),
    };

    let step = repo::update(&state.db, id, &description, completed)
        .await?
        .ok_or_else(|| ApiError::NotFound("Step not found".into()))?;
    Ok(Json(step.into()))
}

#[instrument(skip(state))]
pub async fn delete_step(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedStepResponse>> {
    let step = repo::delete(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Step not found".into()))?;
    Ok(Json(DeletedStepResponse {
        message: "Step deleted successfully".into(),
        step: step.into(),
    }))
}
