use axum::extract::{Query, State};
use axum::Json;
use chrono::{FixedOffset, NaiveDate, Utc};
use serde::Deserialize;

use crate::config::Config;
use crate::dto::{annotate_grid, CalendarResponse};
use crate::error::{AppError, AppResult};
use crate::services::calendar::{MonthGrid, Weekday, YearMonth};
use crate::AppState;

/// Real-world UTC offsets stay within ±14h.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

pub fn utc_offset(minutes: Option<i32>) -> AppResult<FixedOffset> {
    let minutes = minutes.unwrap_or(0);
    if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
        return Err(AppError::Validation(format!(
            "utc_offset_minutes must be between -{0} and {0}",
            MAX_OFFSET_MINUTES
        )));
    }
    FixedOffset::east_opt(minutes * 60)
        .ok_or_else(|| AppError::Validation("Invalid utc_offset_minutes".into()))
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub first_weekday: Option<i64>,
    /// Minutes east of UTC; decides which calendar day is "today".
    pub utc_offset_minutes: Option<i32>,
    pub locale: Option<String>,
}

/// Month, first weekday, and locale for a grid request, falling back to
/// `today`'s month and the configured defaults.
pub fn grid_params(
    year: Option<i64>,
    month: Option<i64>,
    first_weekday: Option<i64>,
    locale: Option<String>,
    today: NaiveDate,
    config: &Config,
) -> AppResult<(YearMonth, Weekday, String)> {
    let year_month = match (year, month) {
        (Some(year), Some(month)) => YearMonth::new(year, month)?,
        (None, None) => YearMonth::of(today),
        _ => {
            return Err(AppError::Validation(
                "year and month must be given together".into(),
            ))
        }
    };
    let first_weekday = match first_weekday {
        Some(index) => Weekday::new(index)?,
        None => config.calendar_first_weekday,
    };
    let locale = locale.unwrap_or_else(|| config.calendar_locale.clone());
    Ok((year_month, first_weekday, locale))
}

/// Public: the bare grid with no journal data.
pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<CalendarResponse>> {
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

    let grid = MonthGrid::build(year_month, first_weekday)?;
    let weeks = annotate_grid(&grid, today, None);
    Ok(Json(CalendarResponse::new(&grid, locale, weeks)))
}
