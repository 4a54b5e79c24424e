use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A single 1-5 mood check-in. Immutable once created; there is no update
/// endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: i32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LogMoodRequest {
    #[validate(range(min = 1, max = 5, message = "Mood must be between 1 and 5"))]
    pub mood: i32,
    #[validate(length(max = 500, message = "Note cannot exceed 500 characters"))]
    pub note: Option<String>,
}
