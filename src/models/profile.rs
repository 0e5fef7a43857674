use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    /// Image URL or data URL.
    pub avatar: Option<String>,
    pub why: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// What a user sees before saving a profile for the first time.
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            avatar: None,
            why: None,
            height: None,
            weight: None,
            gender: None,
            age: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertProfileRequest {
    /// Kept well under axum's default 2 MiB request body limit.
    #[validate(length(max = 1_000_000, message = "Avatar is too large"))]
    pub avatar: Option<String>,
    #[validate(length(max = 1000, message = "Why must be at most 1000 characters"))]
    pub why: Option<String>,
    #[validate(length(max = 32))]
    pub height: Option<String>,
    #[validate(length(max = 32))]
    pub weight: Option<String>,
    #[validate(length(max = 64))]
    pub gender: Option<String>,
    #[validate(length(max = 8))]
    pub age: Option<String>,
}
