//! # Calendar & month view DTOs
//!
//! Response shapes for `/api/calendar` and `/api/journal/month`. The grid
//! engine knows nothing about "today"; handlers read the clock once and
//! hand it to [`annotate_grid`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::journal_entry::LogEntry;
use crate::services::aggregator::{DatedEntry, MonthSummary, MonthlyTotals, SkippedEntry};
use crate::services::calendar::{MonthGrid, Weekday, YearMonth, DAYS_PER_WEEK};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearMonthView {
    pub year: i32,
    pub month: u32,
}

impl From<YearMonth> for YearMonthView {
    fn from(ym: YearMonth) -> Self {
        Self {
            year: ym.year(),
            month: ym.month(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CellView {
    pub date: NaiveDate,
    pub cell_id: String,
    pub in_displayed_month: bool,
    pub is_today: bool,
    pub is_future: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<LogEntry>,
}

/// GET /api/calendar
#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    /// Passed through untouched for client-side formatting.
    pub locale: String,
    pub first_weekday: Weekday,
    pub weekdays: [Weekday; DAYS_PER_WEEK],
    pub previous: Option<YearMonthView>,
    pub next: Option<YearMonthView>,
    pub weeks: Vec<Vec<CellView>>,
}

impl CalendarResponse {
    pub fn new(grid: &MonthGrid, locale: String, weeks: Vec<Vec<CellView>>) -> Self {
        Self {
            year: grid.year_month.year(),
            month: grid.year_month.month(),
            locale,
            first_weekday: grid.first_weekday,
            weekdays: grid.weekdays,
            previous: grid.year_month.previous().ok().map(Into::into),
            next: grid.year_month.next().ok().map(Into::into),
            weeks,
        }
    }
}

/// GET /api/journal/month
#[derive(Debug, Serialize)]
pub struct MonthViewResponse {
    #[serde(flatten)]
    pub calendar: CalendarResponse,
    pub totals: MonthlyTotals,
    pub days_logged: usize,
    pub skipped_count: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// Attach `today`-relative flags and, when given, each day's latest entry.
pub fn annotate_grid(
    grid: &MonthGrid,
    today: NaiveDate,
    days: Option<&BTreeMap<NaiveDate, DatedEntry<'_>>>,
) -> Vec<Vec<CellView>> {
    grid.weeks
        .iter()
        .map(|week| {
            week.iter()
                .map(|cell| CellView {
                    date: cell.date,
                    cell_id: cell.cell_id.clone(),
                    in_displayed_month: cell.in_displayed_month,
                    is_today: cell.date == today,
                    is_future: cell.date > today,
                    entry: days
                        .and_then(|d| d.get(&cell.date))
                        .map(|dated| dated.entry.clone()),
                })
                .collect()
        })
        .collect()
}

impl MonthViewResponse {
    pub fn new(grid: &MonthGrid, locale: String, today: NaiveDate, summary: MonthSummary<'_>) -> Self {
        let weeks = annotate_grid(grid, today, Some(&summary.days));
        Self {
            calendar: CalendarResponse::new(grid, locale, weeks),
            days_logged: summary.days.len(),
            skipped_count: summary.skipped.len(),
            totals: summary.totals,
            skipped: summary.skipped,
        }
    }
}
