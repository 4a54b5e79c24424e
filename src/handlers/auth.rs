use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use rand::RngCore;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    jwt::{create_token_pair, hash_token, verify_token, TokenPair, TokenType},
    middleware::AuthUser,
    password::{hash_password, verify_password},
};
use crate::error::{AppError, AppResult};
use crate::models::user::User;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

async fn store_refresh_token(
    db: &sqlx::PgPool,
    user_id: Uuid,
    raw_refresh_token: &str,
    ttl_secs: i64,
    parent_token_id: Option<Uuid>,
) -> AppResult<Uuid> {
    let token_hash = hash_token(raw_refresh_token);
    let expires_at = Utc::now() + Duration::seconds(ttl_secs);
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, parent_token_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&token_hash)
    .bind(expires_at)
    .bind(parent_token_id)
    .execute(db)
    .await?;

    Ok(id)
}

/// Create a token pair AND persist the refresh token hash in the DB.
async fn issue_token_pair(
    db: &sqlx::PgPool,
    user_id: Uuid,
    email: &str,
    config: &crate::config::Config,
    parent_token_id: Option<Uuid>,
) -> AppResult<TokenPair> {
    let tokens = create_token_pair(user_id, email, config)?;
    store_refresh_token(
        db,
        user_id,
        &tokens.refresh_token,
        config.jwt_refresh_ttl_secs,
        parent_token_id,
    )
    .await?;
    Ok(tokens)
}

/// Revoke all active refresh tokens for a user.
async fn revoke_all_user_tokens(db: &sqlx::PgPool, user_id: Uuid) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = true, revoked_at = NOW()
        WHERE user_id = $1 AND revoked = false
        "#,
    )
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<TokenPair>> {
    body.validate().map_err(AppError::from_validation)?;

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&body.email)
        .fetch_one(&state.db)
        .await?;

    if existing > 0 {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let pwd_hash = hash_password(&body.password)?;
    let user_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id)
    .bind(&body.name)
    .bind(&body.email)
    .bind(&pwd_hash)
    .execute(&state.db)
    .await?;

    let tokens = issue_token_pair(&state.db, user_id, &body.email, &state.config, None).await?;
    Ok(Json(tokens))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    body.validate().map_err(AppError::from_validation)?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&body.email)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let tokens = issue_token_pair(&state.db, user.id, &user.email, &state.config, None).await?;
    Ok(Json(tokens))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    let token_data = verify_token(&body.refresh_token, &state.config)?;

    if token_data.claims.token_type != TokenType::Refresh {
        return Err(AppError::Unauthorized);
    }

    let token_hash = hash_token(&body.refresh_token);

    let stored = sqlx::query_as::<_, (Uuid, Uuid, bool)>(
        r#"
        SELECT id, user_id, revoked
        FROM refresh_tokens
        WHERE token_hash = $1
        "#,
    )
    .bind(&token_hash)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::Unauthorized)?;

    let (stored_id, stored_user_id, revoked) = stored;

    // Reuse detection: a revoked token being replayed burns the whole family.
    if revoked {
        tracing::warn!(
            user_id = %stored_user_id,
            token_id = %stored_id,
            "Refresh token reuse detected — revoking all tokens for user"
        );
        revoke_all_user_tokens(&state.db, stored_user_id).await?;
        return Err(AppError::Unauthorized);
    }

    if stored_user_id != token_data.claims.sub {
        return Err(AppError::Unauthorized);
    }

    // Single-use rotation.
    sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = true, revoked_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(stored_id)
    .execute(&state.db)
    .await?;

    let tokens = issue_token_pair(
        &state.db,
        token_data.claims.sub,
        &token_data.claims.email,
        &state.config,
        Some(stored_id),
    )
    .await?;
    Ok(Json(tokens))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<serde_json::Value>> {
    revoke_all_user_tokens(&state.db, auth_user.id).await?;
    Ok(Json(serde_json::json!({ "message": "Logged out successfully" })))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    body.validate().map_err(AppError::from_validation)?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&body.email)
        .fetch_optional(&state.db)
        .await?;

    // The response never reveals whether the address exists.
    if let Some(user) = user {
        let mut raw = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut raw);
        let reset_token = hex::encode(raw);
        let expires_at = Utc::now() + Duration::hours(1);

        sqlx::query(
            r#"
            UPDATE users
            SET reset_token_hash = $2, reset_token_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(hash_token(&reset_token))
        .bind(expires_at)
        .execute(&state.db)
        .await?;

        // TODO: deliver by email once an outbound mail provider is wired up.
        tracing::info!(
            user_id = %user.id,
            "Password reset link: {}/reset-password/{}",
            state.config.frontend_url,
            reset_token
        );
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "If that email is registered, a reset link has been sent",
    })))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<ResetPasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    body.validate().map_err(AppError::from_validation)?;

    let token_hash = hash_token(&token);

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT * FROM users
        WHERE reset_token_hash = $1 AND reset_token_expires_at > NOW()
        "#,
    )
    .bind(&token_hash)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::Validation("Invalid or expired reset token".into()))?;

    let pwd_hash = hash_password(&body.password)?;

    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $2, reset_token_hash = NULL, reset_token_expires_at = NULL,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user.id)
    .bind(&pwd_hash)
    .execute(&state.db)
    .await?;

    // Any session issued before the reset is no longer trustworthy.
    revoke_all_user_tokens(&state.db, user.id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Password reset successful. You can now log in with your new password.",
    })))
}
