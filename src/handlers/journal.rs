use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::journal::{CreateJournalRequest, JournalEntry, UpdateJournalRequest};
use crate::AppState;

/// Fetch an entry by id and enforce ownership: a missing entry is 404, an
/// entry owned by someone else is 403.
async fn fetch_owned_entry(
    state: &AppState,
    entry_id: Uuid,
    auth_user: &AuthUser,
) -> AppResult<JournalEntry> {
    let entry = sqlx::query_as::<_, JournalEntry>("SELECT * FROM journal_entries WHERE id = $1")
        .bind(entry_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Journal entry not found".into()))?;

    if entry.user_id != auth_user.id {
        return Err(AppError::Forbidden);
    }

    Ok(entry)
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<JournalEntry>>> {
    let entries = sqlx::query_as::<_, JournalEntry>(
        r#"
        SELECT * FROM journal_entries
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<JournalEntry>> {
    let entry = fetch_owned_entry(&state, entry_id, &auth_user).await?;
    Ok(Json(entry))
}

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateJournalRequest>,
) -> AppResult<(StatusCode, Json<JournalEntry>)> {
    body.validate().map_err(AppError::from_validation)?;

    let entry = sqlx::query_as::<_, JournalEntry>(
        r#"
        INSERT INTO journal_entries (id, user_id, content, mood, tags, is_private)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.content)
    .bind(body.mood)
    .bind(&body.tags)
    .bind(body.is_private.unwrap_or(true))
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
    Json(body): Json<UpdateJournalRequest>,
) -> AppResult<Json<JournalEntry>> {
    body.validate().map_err(AppError::from_validation)?;

    let _existing = fetch_owned_entry(&state, entry_id, &auth_user).await?;

    let entry = sqlx::query_as::<_, JournalEntry>(
        r#"
        UPDATE journal_entries SET
            content = COALESCE($3, content),
            mood = COALESCE($4, mood),
            tags = COALESCE($5, tags),
            is_private = COALESCE($6, is_private),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(entry_id)
    .bind(auth_user.id)
    .bind(&body.content)
    .bind(body.mood)
    .bind(&body.tags)
    .bind(body.is_private)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let entry = fetch_owned_entry(&state, entry_id, &auth_user).await?;

    sqlx::query("DELETE FROM journal_entries WHERE id = $1")
        .bind(entry.id)
        .execute(&state.db)
        .await?;

    Ok(Json(serde_json::json!({ "id": entry.id })))
}
