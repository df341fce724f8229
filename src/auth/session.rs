use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::auth::tokens::TokenKeys;
use crate::error::ApiError;

/// Upper bound on concurrently valid refresh tokens per user; the oldest
/// session is evicted when the cap is exceeded.
pub const MAX_SESSIONS_PER_USER: i64 = 10;

#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issue an access/refresh pair and persist the refresh token in the user's
/// token set, trimming the set to the session cap.
pub async fn issue_pair(db: &PgPool, keys: &TokenKeys, user_id: Uuid) -> Result<TokenPair, ApiError> {
    let access_token = keys.sign_access(user_id)?;
    let refresh_token = keys.sign_refresh(user_id)?;

    let mut tx = db.begin().await?;
    sqlx::query("INSERT INTO refresh_tokens (user_id, token) VALUES ($1, $2)")
        .bind(user_id)
        .bind(&refresh_token)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        r#"
        DELETE FROM refresh_tokens
        WHERE user_id = $1
          AND id NOT IN (
              SELECT id FROM refresh_tokens
              WHERE user_id = $1
              ORDER BY issued_at DESC, id DESC
              LIMIT $2
          )
        "#,
    )
    .bind(user_id)
    .bind(MAX_SESSIONS_PER_USER)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Rotate a refresh token: the presented token is replaced in place by a
/// fresh one, as a single conditional update. The token is single-use — a
/// second rotation with the same token finds zero rows and is rejected.
/// A well-signed token that is not in the set is treated as replay: the
/// whole set is cleared, logging the user out everywhere.
pub async fn rotate(db: &PgPool, keys: &TokenKeys, token: &str) -> Result<TokenPair, ApiError> {
    let claims = keys
        .verify_refresh(token)
        .map_err(|e| ApiError::Forbidden(e.to_string()))?;
    let user_id = claims.sub;

    let access_token = keys.sign_access(user_id)?;
    let refresh_token = keys.sign_refresh(user_id)?;

    let replaced = sqlx::query(
        "UPDATE refresh_tokens SET token = $3, issued_at = now() WHERE user_id = $1 AND token = $2",
    )
    .bind(user_id)
    .bind(token)
    .bind(&refresh_token)
    .execute(db)
    .await?
    .rows_affected();

    if replaced == 0 {
        revoke_all(db, user_id).await?;
        warn!(user_id = %user_id, "unknown refresh token presented; all sessions revoked");
        return Err(ApiError::Forbidden("Invalid request".into()));
    }

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Logout: remove exactly the presented token from the set. Unknown tokens
/// get the same replay treatment as in rotation.
pub async fn revoke(db: &PgPool, keys: &TokenKeys, token: &str) -> Result<(), ApiError> {
    let claims = keys
        .verify_refresh(token)
        .map_err(|e| ApiError::Forbidden(e.to_string()))?;
    let user_id = claims.sub;

    let removed = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1 AND token = $2")
        .bind(user_id)
        .bind(token)
        .execute(db)
        .await?
        .rows_affected();

    if removed == 0 {
        revoke_all(db, user_id).await?;
        warn!(user_id = %user_id, "unknown refresh token on logout; all sessions revoked");
        return Err(ApiError::Forbidden("Invalid request".into()));
    }

    Ok(())
}

pub async fn revoke_all(db: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::state::AppState;

    fn make_keys() -> TokenKeys {
        TokenKeys::from_config(&TokenConfig {
            access_secret: "access-secret".into(),
            refresh_secret: "refresh-secret".into(),
            access_ttl_seconds: 60,
        })
    }

    #[tokio::test]
    async fn rotate_rejects_garbage_before_touching_the_database() {
        // The lazy pool never connects; a signature failure must short-circuit.
        let state = AppState::fake();
        let keys = make_keys();
        let err = rotate(&state.db, &keys, "not-a-jwt").await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn revoke_rejects_access_tokens() {
        // An access token is signed with the other secret, so it must fail
        // verification as a refresh token.
        let state = AppState::fake();
        let keys = make_keys();
        let access = keys.sign_access(Uuid::new_v4()).expect("sign access");
        let err = revoke(&state.db, &keys, &access).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
