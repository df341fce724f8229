use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            GoogleLoginRequest, LoginRequest, LoginResponse, RegisterRequest, TokenPairResponse,
            UserSummary,
        },
        extractor::BearerToken,
        password::{hash_password, verify_password},
        repo::User,
        session,
        tokens::TokenKeys,
    },
    error::{ApiError, ApiResult},
    images,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/google", post(google))
        .route("/auth/refreshToken", post(refresh))
        .route("/auth/logout", post(logout))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn user_summary(state: &AppState, user: &User) -> UserSummary {
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

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserSummary>)> {
    let (name, email, password) = match (payload.name, payload.email, payload.password) {
        (Some(n), Some(e), Some(p)) if !n.is_empty() && !e.is_empty() && !p.is_empty() => {
            (n, e, p)
        }
        _ => return Err(ApiError::Validation("Missing required fields".into())),
    };
    let email = email.trim().to_lowercase();

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    let hash = hash_password(&password)?;
    let user = User::create(
        &state.db,
        &name,
        &email,
        &hash,
        payload.profile_image.as_deref(),
    )
    .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user_summary(&state, &user))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (email, password) = match (payload.email, payload.password) {
        (Some(e), Some(p)) => (e, p),
        _ => return Err(ApiError::Validation("Missing email or password".into())),
    };
    let email = email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Validation("Bad email or password".into()))?;

    // Google-created accounts have no password to check.
    let ok = match user.password_hash.as_deref() {
        Some(hash) => verify_password(&password, hash)?,
        None => false,
    };
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Validation("Bad email or password".into()));
    }

    let keys = TokenKeys::from_ref(&state);
    let pair = session::issue_pair(&state.db, &keys, user.id).await?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        profile_image: images::absolute_profile_image_url(
            &state.config.server_url,
            &user.profile_image,
        ),
    }))
}

#[instrument(skip(state, payload))]
pub async fn google(
    State(state): State<AppState>,
    Json(payload): Json<GoogleLoginRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    let profile = state.google.verify(&payload.token).await.map_err(|e| {
        warn!(error = %e, "google token rejected");
        ApiError::Unauthorized("Invalid Google token".into())
    })?;

    let user = match User::find_by_email(&state.db, &profile.email).await? {
        Some(u) => u,
        None => {
            let user = User::create_from_google(
                &state.db,
                &profile.name,
                &profile.email,
                &profile.sub,
                profile.picture.as_deref(),
            )
            .await?;
            info!(user_id = %user.id, "user created from google sign-in");
            user
        }
    };

    let keys = TokenKeys::from_ref(&state);
    let pair = session::issue_pair(&state.db, &keys, user.id).await?;

    Ok(Json(TokenPairResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

#[instrument(skip(state, token))]
pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<TokenPairResponse>> {
    let keys = TokenKeys::from_ref(&state);
    let pair = session::rotate(&state.db, &keys, &token).await?;
    Ok(Json(TokenPairResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

#[instrument(skip(state, token))]
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<StatusCode> {
    let keys = TokenKeys::from_ref(&state);
    session::revoke(&state.db, &keys, &token).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("spaces in@x.com"));
    }
}
