use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        dto::UserSummary,
        handlers::is_valid_email,
        password::hash_password,
        repo::User,
        AuthUser,
    },
    error::{ApiError, ApiResult},
    images,
    state::AppState,
    users::repo::{self, UserUpdate},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
}

fn summary(state: &AppState, user: &User) -> UserSummary {
    UserSummary {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        profile_image: images::absolute_profile_image_url(
            &state.config.server_url,
            &user.profile_image,
        ),
    }
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let users = repo::list(&state.db).await?;
    Ok(Json(users.iter().map(|u| summary(&state, u)).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserSummary>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(summary(&state, &user)))
}

#[instrument(skip(state, mp))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
    mut mp: Multipart,
) -> ApiResult<Json<UserSummary>> {
    let mut upd = UserUpdate::default();

    while let Ok(Some(field)) = mp.next_field().await {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("username") => {
                upd.username = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.to_string()))?,
                );
            }
            Some("email") => {
                upd.email = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.to_string()))?
                        .trim()
                        .to_lowercase(),
                );
            }
            Some("password") => {
                let plain = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                if plain.is_empty() {
                    return Err(ApiError::Validation("Cannot update to empty fields".into()));
                }
                upd.password_hash = Some(hash_password(&plain)?);
            }
            Some("profileImage") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                let (key, file_name) = images::profile_image_key(id, &content_type);
                state.storage.put_object(&key, data).await?;
                upd.profile_image = Some(file_name);
            }
            _ => {}
        }
    }

    if matches!(upd.username.as_deref(), Some("")) || matches!(upd.email.as_deref(), Some("")) {
        return Err(ApiError::Validation("Cannot update to empty fields".into()));
    }
    if let Some(email) = upd.email.as_deref() {
        if !is_valid_email(email) {
            return Err(ApiError::Validation("Invalid email".into()));
        }
    }

    let user = repo::update(&state.db, id, upd)
        .await?
        .ok_or_else(|| ApiError::Validation("User not found".into()))?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(summary(&state, &user)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserSummary>> {
    let user = repo::delete(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    info!(user_id = %id, "user deleted");
    Ok(Json(summary(&state, &user)))
}
