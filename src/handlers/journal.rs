use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Offset, SecondsFormat, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::MonthViewResponse;
use crate::error::{AppError, AppResult};
use crate::handlers::calendar::{grid_params, utc_offset, CalendarQuery};
use crate::models::journal_entry::{CreateLogEntryRequest, LogEntry};
use crate::services::aggregator::{parse_timestamp, summarize_month};
use crate::services::calendar::MonthGrid;
use crate::AppState;

/// The stored timestamp for a new entry: the client's value verbatim when it
/// parses, otherwise `now` in RFC 3339.
pub fn entry_timestamp(raw: Option<&str>, now: DateTime<Utc>) -> AppResult<String> {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            // Only the format is checked; the instant is the client's to choose.
            if parse_timestamp(raw, Utc.fix()).is_none() {
                return Err(AppError::Validation(format!("Unrecognized timestamp: {raw}")));
            }
            Ok(raw.to_string())
        }
        _ => Ok(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
    }
}

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateLogEntryRequest>,
) -> AppResult<(StatusCode, Json<LogEntry>)> {
    body.validate()?;

    let timestamp = entry_timestamp(body.timestamp.as_deref(), Utc::now())?;

    let entry = sqlx::query_as::<_, LogEntry>(
        r#"
        INSERT INTO journal_entries
            (id, user_id, recorded_at, water, sleep, outdoors, activity,
             cooked_at_home, eating_out_cost, emotion, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&timestamp)
    .bind(body.water)
    .bind(body.sleep)
    .bind(body.outdoors)
    .bind(body.activity)
    .bind(body.cooked_at_home)
    .bind(body.effective_eating_out_cost())
    .bind(&body.emotion)
    .bind(&body.notes)
    .fetch_one(&state.db)
    .await?;

    tracing::debug!(
        user_id = %auth_user.id,
        username = %auth_user.username,
        entry_id = %entry.id,
        "Journal entry created"
    );

    Ok((StatusCode::CREATED, Json(entry)))
}

async fn fetch_entries(db: &sqlx::PgPool, auth_user: &AuthUser) -> AppResult<Vec<LogEntry>> {
    let entries = sqlx::query_as::<_, LogEntry>(
        r#"
        SELECT * FROM journal_entries
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(db)
    .await?;
    Ok(entries)
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<LogEntry>>> {
    Ok(Json(fetch_entries(&state.db, &auth_user).await?))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    // Idempotent: already-gone entries still answer 200.
    let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1 AND user_id = $2")
        .bind(entry_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    Ok(Json(serde_json::json!({
        "deleted": result.rows_affected() > 0,
        "id": entry_id,
    })))
}

/// Calendar grid for one month with each day's latest entry and month totals.
pub async fn month_view(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<MonthViewResponse>> {
    let offset = utc_offset(query.utc_offset_minutes)?;
    let today = Utc::now().with_timezone(&offset).date_naive();

    let (year_month, first_weekday, locale) = grid_params(
        query.year,
        query.month,
        query.first_weekday,
        query.locale,
        today,
        &state.config,
    )?;

    let entries = fetch_entries(&state.db, &auth_user).await?;
    let summary = summarize_month(&entries, year_month, offset);

    if !summary.skipped.is_empty() {
        tracing::warn!(
            user_id = %auth_user.id,
            skipped = summary.skipped.len(),
            year = year_month.year(),
            month = year_month.month(),
            "Skipped malformed journal entries"
        );
    }

    let grid = MonthGrid::build(year_month, first_weekday)?;
    Ok(Json(MonthViewResponse::new(&grid, locale, today, summary)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_entry_timestamp_defaults_to_now() {
        assert_eq!(entry_timestamp(None, now()).unwrap(), "2024-03-05T08:30:00Z");
        assert_eq!(entry_timestamp(Some("   "), now()).unwrap(), "2024-03-05T08:30:00Z");
    }

    #[test]
    fn test_entry_timestamp_keeps_client_value() {
        // Past and future instants are both the client's call.
        assert_eq!(
            entry_timestamp(Some("2019-01-01T07:00"), now()).unwrap(),
            "2019-01-01T07:00"
        );
        assert_eq!(
            entry_timestamp(Some(" 2031-12-31T23:59:59+09:00 "), now()).unwrap(),
            "2031-12-31T23:59:59+09:00"
        );
    }

    #[test]
    fn test_entry_timestamp_rejects_unparseable() {
        assert!(matches!(
            entry_timestamp(Some("next tuesday"), now()),
            Err(AppError::Validation(_))
        ));
    }
}
