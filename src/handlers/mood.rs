use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::mood::{LogMoodRequest, MoodEntry};
use crate::services::stats::{mood_stats, MoodStats};
use crate::AppState;

pub async fn log_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<LogMoodRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    body.validate().map_err(AppError::from_validation)?;

    let entry = sqlx::query_as::<_, MoodEntry>(
        r#"
        INSERT INTO mood_entries (id, user_id, mood, note)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.mood)
    .bind(body.note.as_deref().unwrap_or(""))
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Mood logged successfully",
            "mood": entry,
        })),
    ))
}

/// Mood check-ins from the last 7 days, newest first.
pub async fn mood_history(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let window_start = Utc::now() - Duration::days(7);

    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1 AND created_at >= $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(window_start)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

pub async fn get_mood_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<MoodStats>> {
    let window_start = Utc::now() - Duration::days(7);

    let entries = sqlx::query_as::<_, (DateTime<Utc>, i32)>(
        r#"
        SELECT created_at, mood FROM mood_entries
        WHERE user_id = $1 AND created_at >= $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(window_start)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(mood_stats(&entries)))
}
