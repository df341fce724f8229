use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    likes::repo,
    state::AppState,
};

pub fn like_routes() -> Router<AppState> {
    Router::new()
        .route("/likes", post(add_like))
        .route("/likes/:postId", delete(remove_like))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub post_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct LikeMessage {
    pub message: String,
}

#[instrument(skip(state))]
pub async fn add_like(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<LikeRequest>,
) -> ApiResult<(StatusCode, Json<LikeMessage>)> {
    let post_id = payload
        .post_id
        .ok_or_else(|| ApiError::Validation("required body not provided".into()))?;

    repo::add(&state.db, user_id, post_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(LikeMessage {
            message: "Like added successfully".into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn remove_like(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<LikeMessage>> {
    let removed = repo::remove(&state.db, user_id, post_id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound("Like not found".into()));
    }
    Ok(Json(LikeMessage {
        message: "Like deleted successfully".into(),
    }))
}
