use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{repo::User, AuthUser},
    error::{ApiError, ApiResult},
    images,
    posts::{
        dto::{
            DeletedResponse, FeedQuery, FeedResponse, PostSummary, PostView, PosterView,
            SenderQuery, UpdatePostRequest,
        },
        repo,
        repo::{FeedRow, Post},
    },
    state::AppState,
};

const MAX_POST_IMAGES: usize = 4;
const MAX_PAGE_SIZE: i64 = 50;

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/sender", get(posts_by_sender))
        .route("/posts/:id", get(get_post).put(update_post).delete(delete_post))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
}

fn into_view(state: &AppState, row: FeedRow) -> PostView {
    let server_url = &state.config.server_url;
    PostView {
        id: row.id,
        description: row.description,
        publish_time: row.publish_time,
        image_urls: row
            .image_urls
            .iter()
            .map(|name| images::absolute_post_image_url(server_url, name))
            .collect(),
        poster: PosterView {
            id: row.poster_id,
            username: row.poster_username,
            profile_image: images::absolute_profile_image_url(
                server_url,
                &row.poster_profile_image,
            ),
        },
        likes_count: row.likes_count,
        is_liked_by_user: row.is_liked_by_user,
        comments: row.comments.0,
    }
}

fn into_summary(state: &AppState, post: Post) -> PostSummary {
    PostSummary {
        id: post.id,
        description: post.description,
        publish_time: post.publish_time,
        image_urls: post
            .image_urls
            .iter()
            .map(|name| images::absolute_post_image_url(&state.config.server_url, name))
            .collect(),
        poster_id: post.poster_id,
    }
}

/// The page is full exactly when it holds `limit` rows; the caller should
/// then ask for the next one.
fn has_more(returned: usize, limit: i64) -> bool {
    returned as i64 == limit
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Query(q): Query<FeedQuery>,
) -> ApiResult<Json<FeedResponse>> {
    let page = q.page.max(1);
    let limit = q.limit.clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * limit;

    let rows = repo::feed_page(&state.db, viewer, limit, offset).await?;
    let more = has_more(rows.len(), limit);
    let posts = rows.into_iter().map(|r| into_view(&state, r)).collect();

    Ok(Json(FeedResponse {
        page,
        limit,
        posts,
        has_more: more,
    }))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PostView>> {
    let row = repo::view_one(&state.db, viewer, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;
    Ok(Json(into_view(&state, row)))
}

#[instrument(skip(state))]
pub async fn posts_by_sender(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
    Query(q): Query<SenderQuery>,
) -> ApiResult<Json<Vec<PostSummary>>> {
    let sender = q
        .id
        .ok_or_else(|| ApiError::NotFound("senderId not provided".into()))?;
    let posts = repo::by_poster(&state.db, sender).await?;
    Ok(Json(
        posts.into_iter().map(|p| into_summary(&state, p)).collect(),
    ))
}

#[instrument(skip(state, mp))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> ApiResult<Json<PostView>> {
    let mut description: Option<String> = None;
    let mut files: Vec<(Bytes, String)> = Vec::new();

    while let Ok(Some(field)) = mp.next_field().await {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("description") => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.to_string()))?,
                );
            }
            Some("images") | Some("images[]") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                files.push((data, content_type));
            }
            _ => {}
        }
    }

    let description = match description {
        Some(d) if !d.is_empty() => d,
        _ => return Err(ApiError::Validation("required body not provided".into())),
    };
    if files.len() > MAX_POST_IMAGES {
        return Err(ApiError::Validation(format!(
            "At most {} images per post",
            MAX_POST_IMAGES
        )));
    }

    let mut names = Vec::with_capacity(files.len());
    for (body, content_type) in files {
        let (key, name) = images::post_image_key(&content_type);
        state.storage.put_object(&key, body).await?;
        names.push(name);
    }

    let post = repo::insert(&state.db, user_id, &description, &names).await?;
    let poster = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(post_id = %post.id, user_id = %user_id, "post created");
    Ok(Json(PostView {
        id: post.id,
        description: post.description,
        publish_time: post.publish_time,
        image_urls: post
            .image_urls
            .iter()
            .map(|n| images::absolute_post_image_url(&state.config.server_url, n))
            .collect(),
        poster: PosterView {
            id: poster.id,
            username: poster.username,
            profile_image: images::absolute_profile_image_url(
                &state.config.server_url,
                &poster.profile_image,
            ),
        },
        likes_count: 0,
        is_liked_by_user: false,
        comments: vec![],
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> ApiResult<Json<PostSummary>> {
    let description = match payload.description {
        Some(d) if !d.is_empty() => d,
        _ => return Err(ApiError::Validation("required body not provided".into())),
    };

    let post = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;
    if post.poster_id != user_id {
        return Err(ApiError::Forbidden("Not the post owner".into()));
    }

    let updated = repo::update_description(&state.db, id, &description)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;
    Ok(Json(into_summary(&state, updated)))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedResponse>> {
    let post = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;
    if post.poster_id != user_id {
        return Err(ApiError::Forbidden("Not the post owner".into()));
    }

    repo::delete(&state.db, id).await?;

    // Best effort; the row is already gone.
    for name in &post.image_urls {
        let key = format!("{}/{}", images::services::POST_IMAGES_DIR, name);
        if let Err(e) = state.storage.delete_object(&key).await {
            warn!(error = %e, key = %key, "failed to delete post image");
        }
    }

    info!(post_id = %id, user_id = %user_id, "post deleted");
    Ok(Json(DeletedResponse {
        message: "Post deleted successfully".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_more_only_on_full_pages() {
        assert!(has_more(10, 10));
        assert!(!has_more(9, 10));
        assert!(!has_more(0, 10));
    }
}
