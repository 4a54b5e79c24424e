use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use validator::Validate;

use crate::auth::{
    middleware::AuthUser,
    password::{hash_password, verify_password},
};
use crate::error::{AppError, AppResult};
use crate::models::user::{
    ChangePasswordRequest, UpdateProfileRequest, User, UserProfile, UserStatsResponse,
};
use crate::services::stats::compute_user_stats;
use crate::AppState;

async fn fetch_user(state: &AppState, auth_user: &AuthUser) -> AppResult<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(auth_user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))
}

/// Profile dashboard stats: streak, monthly counts and totals, derived from
/// the user's journal timestamps and mood count.
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserStatsResponse>> {
    let user = fetch_user(&state, &auth_user).await?;

    let entry_times = sqlx::query_scalar::<_, DateTime<Utc>>(
        r#"
        SELECT created_at FROM journal_entries
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    let total_moods =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM mood_entries WHERE user_id = $1")
            .bind(auth_user.id)
            .fetch_one(&state.db)
            .await?;

    let stats = compute_user_stats(&entry_times, user.created_at, total_moods, Utc::now());

    Ok(Json(UserStatsResponse {
        success: true,
        stats,
    }))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserProfile>> {
    let user = fetch_user(&state, &auth_user).await?;
    Ok(Json(user.into()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserProfile>> {
    body.validate().map_err(AppError::from_validation)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET name = COALESCE($2, name), updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(auth_user.id)
    .bind(&body.name)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(user.into()))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    body.validate().map_err(AppError::from_validation)?;

    let user = fetch_user(&state, &auth_user).await?;

    if !verify_password(&body.current_password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let pwd_hash = hash_password(&body.new_password)?;
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(auth_user.id)
        .bind(&pwd_hash)
        .execute(&state.db)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Password changed successfully",
    })))
}

/// Delete the account and everything it owns. Journal entries, mood entries
/// and refresh tokens all cascade with the user row.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    tracing::info!(user_id = %auth_user.id, "Account deleted");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Account deleted successfully",
    })))
}
