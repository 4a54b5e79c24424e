use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub mood: JournalMood,
    pub tags: Vec<String>,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fixed mood label set for journal entries. The request boundary rejects
/// anything outside it via typed deserialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "journal_mood", rename_all = "lowercase")]
pub enum JournalMood {
    Happy,
    Calm,
    Neutral,
    Anxious,
    Sad,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJournalRequest {
    #[validate(length(min = 1, message = "Please add journal content"))]
    pub content: String,
    pub mood: JournalMood,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_private: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateJournalRequest {
    #[validate(length(min = 1, message = "Journal content cannot be empty"))]
    pub content: Option<String>,
    pub mood: Option<JournalMood>,
    pub tags: Option<Vec<String>>,
    pub is_private: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_labels_roundtrip() {
        for (label, mood) in [
            ("\"Happy\"", JournalMood::Happy),
            ("\"Calm\"", JournalMood::Calm),
            ("\"Neutral\"", JournalMood::Neutral),
            ("\"Anxious\"", JournalMood::Anxious),
            ("\"Sad\"", JournalMood::Sad),
        ] {
            let parsed: JournalMood = serde_json::from_str(label).unwrap();
            assert_eq!(parsed, mood);
            assert_eq!(serde_json::to_string(&mood).unwrap(), label);
        }
    }

    #[test]
    fn test_unknown_mood_label_rejected() {
        assert!(serde_json::from_str::<JournalMood>("\"Ecstatic\"").is_err());
    }
}
