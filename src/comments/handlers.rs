use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    comments::{
        dto::{
            CommentResponse, CommentWithUser, CreateCommentRequest, DeletedCommentResponse,
            UpdateCommentRequest,
        },
        repo,
        repo::Comment,
    },
    error::{ApiError, ApiResult},
    posts,
    state::AppState,
};

pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/comments", post(create_comment))
        .route(
            "/comments/:id",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
        .route("/comments/post/:postId", get(comments_by_post))
}

fn into_response(c: Comment) -> CommentResponse {
    CommentResponse {
        id: c.id,
        content: c.content,
        commentor_id: c.commentor_id,
        post_id: c.post_id,
    }
}

#[instrument(skip(state, payload))]
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateCommentRequest>,
) -> ApiResult<Json<CommentResponse>> {
    let (content, post_id) = match (payload.content, payload.post_id) {
        (Some(c), Some(p)) if !c.is_empty() => (c, p),
        _ => return Err(ApiError::Validation("required body not provided".into())),
    };

    if posts::repo::find_by_id(&state.db, post_id).await?.is_none() {
        return Err(ApiError::Validation("post does not exist".into()));
    }

    let comment = repo::insert(&state.db, user_id, post_id, &content).await?;
    Ok(Json(into_response(comment)))
}

#[instrument(skip(state))]
pub async fn get_comment(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CommentResponse>> {
    let comment = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;
    Ok(Json(into_response(comment)))
}

#[instrument(skip(state))]
pub async fn comments_by_post(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentWithUser>>> {
    if posts::repo::find_by_id(&state.db, post_id).await?.is_none() {
        return Err(ApiError::NotFound("Post does not exist".into()));
    }

    let rows = repo::by_post(&state.db, post_id).await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound(
            "No comments found for this post".into(),
        ));
    }

    Ok(Json(
        rows.into_iter()
            .map(|r| CommentWithUser {
                id: r.id,
                content: r.content,
                username: r.username,
                post_id: r.post_id,
            })
            .collect(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_comment(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCommentRequest>,
) -> ApiResult<Json<CommentResponse>> {
    let content = match payload.content {
        Some(c) if !c.is_empty() => c,
        _ => return Err(ApiError::Validation("required body not provided".into())),
    };

    let comment = repo::update_content(&state.db, id, &content)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;
    Ok(Json(into_response(comment)))
}

#[instrument(skip(state))]
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedCommentResponse>> {
    let comment = repo::delete(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;
    Ok(Json(DeletedCommentResponse {
        message: "Comment deleted successfully".into(),
        deleted_comment: into_response(comment),
    }))
}
