use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user, returned by profile endpoints.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128, message = "New password must be 8-128 characters"))]
    pub new_password: String,
}

/// Derived metrics for the profile dashboard. Serialized inside the
/// `{ success, stats }` envelope the client expects.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub journal_streak: i64,
    pub entries_this_month: i64,
    pub self_care_minutes: i64,
    pub total_entries: i64,
    pub days_active: i64,
    pub total_moods: i64,
}

#[derive(Debug, Serialize)]
pub struct UserStatsResponse {
    pub success: bool,
    pub stats: UserStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_shape() {
        let resp = UserStatsResponse {
            success: true,
            stats: UserStats {
                journal_streak: 3,
                entries_this_month: 5,
                self_care_minutes: 0,
                total_entries: 12,
                days_active: 40,
                total_moods: 9,
            },
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["stats"]["journalStreak"], 3);
        assert_eq!(json["stats"]["entriesThisMonth"], 5);
        assert_eq!(json["stats"]["selfCareMinutes"], 0);
        assert_eq!(json["stats"]["totalEntries"], 12);
        assert_eq!(json["stats"]["daysActive"], 40);
        assert_eq!(json["stats"]["totalMoods"], 9);
    }

    #[test]
    fn test_user_serialization_hides_secrets() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$...".into(),
            reset_token_hash: Some("abc".into()),
            reset_token_expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("reset_token_hash").is_none());
    }
}
