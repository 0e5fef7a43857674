use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// 5-point mood scale, happiest first.
pub const MOOD_SCALE: [&str; 5] = ["😄", "🙂", "😐", "🙁", "😢"];

/// One journal submission.
///
/// `timestamp` is stored exactly as the client sent it and is only parsed
/// when entries are aggregated; see `services::aggregator`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "recorded_at")]
    pub timestamp: String,
    /// Ounces.
    pub water: f64,
    /// Hours.
    pub sleep: f64,
    /// Minutes.
    pub outdoors: f64,
    /// Minutes.
    pub activity: f64,
    pub cooked_at_home: bool,
    pub eating_out_cost: f64,
    pub emotion: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLogEntryRequest {
    /// Defaults to the server clock when omitted.
    pub timestamp: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 1000.0, message = "Water must be 0-1000 oz"))]
    pub water: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 24.0, message = "Sleep must be 0-24 hours"))]
    pub sleep: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 1440.0, message = "Outdoors must be 0-1440 minutes"))]
    pub outdoors: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 1440.0, message = "Activity must be 0-1440 minutes"))]
    pub activity: f64,

    #[serde(default)]
    pub cooked_at_home: bool,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 100000.0, message = "Eating out cost must be 0-100000"))]
    pub eating_out_cost: f64,

    #[validate(custom = "validate_emotion")]
    pub emotion: String,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

fn validate_emotion(emotion: &str) -> Result<(), ValidationError> {
    if MOOD_SCALE.contains(&emotion) {
        Ok(())
    } else {
        Err(ValidationError::new("emotion_not_on_scale"))
    }
}

impl CreateLogEntryRequest {
    /// Dining cost only applies to meals eaten out.
    pub fn effective_eating_out_cost(&self) -> f64 {
        if self.cooked_at_home {
            0.0
        } else {
            self.eating_out_cost
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> CreateLogEntryRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_minimal_request_defaults_quantities() {
        let req = request(r#"{"emotion":"🙂"}"#);
        assert_eq!(req.water, 0.0);
        assert!(!req.cooked_at_home);
        assert!(req.timestamp.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_rejects_emotion_off_scale() {
        let req = request(r#"{"emotion":"angry"}"#);
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("emotion"));
    }

    #[test]
    fn test_rejects_negative_quantity() {
        let req = request(r#"{"emotion":"😐","water":-4}"#);
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("water"));
    }

    #[test]
    fn test_rejects_sleep_over_a_day() {
        let req = request(r#"{"emotion":"😐","sleep":25}"#);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_cost_ignored_when_cooked_at_home() {
        let req = request(r#"{"emotion":"😄","cooked_at_home":true,"eating_out_cost":12.5}"#);
        assert_eq!(req.effective_eating_out_cost(), 0.0);

        let req = request(r#"{"emotion":"😄","cooked_at_home":false,"eating_out_cost":12.5}"#);
        assert_eq!(req.effective_eating_out_cost(), 12.5);
    }
}
