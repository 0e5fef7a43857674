//! # Calendar grid engine
//!
//! Lays out a month as a rectangular grid of day offsets. An offset is a
//! day-of-month number relative to the displayed month: `1` is the 1st,
//! `0` is the last day of the previous month, and values past the month's
//! length spill into the next month. Every function here is pure; callers
//! that need "today" pass it in.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

pub const DAYS_PER_WEEK: usize = 7;

const MIN_YEAR: i64 = 1;
const MAX_YEAR: i64 = 9999;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("first weekday must be between 0 and 6, got {0}")]
    InvalidWeekday(i64),

    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(i64),

    #[error("year must be between 1 and 9999, got {0}")]
    InvalidYear(i64),

    #[error("day offset {0} is outside the supported date range")]
    OffsetOutOfRange(i32),
}

/// Day of the week, 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Weekday(u8);

impl Weekday {
    pub const SUNDAY: Self = Self(0);
    pub const MONDAY: Self = Self(1);

    pub fn new(index: i64) -> Result<Self, CalendarError> {
        if (0..DAYS_PER_WEEK as i64).contains(&index) {
            Ok(Self(index as u8))
        } else {
            Err(CalendarError::InvalidWeekday(index))
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self(date.weekday().num_days_from_sunday() as u8)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// A validated (year, month) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i64, month: i64) -> Result<Self, CalendarError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalendarError::InvalidYear(year));
        }
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        NaiveDate::from_ymd_opt(year as i32, month as u32, 1)
            .map(|first| Self { first })
            .ok_or(CalendarError::InvalidYear(year))
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date - Duration::days(date.day0() as i64),
        }
    }

    pub fn year(self) -> i32 {
        self.first.year()
    }

    pub fn month(self) -> u32 {
        self.first.month()
    }

    pub fn first_day(self) -> NaiveDate {
        self.first
    }

    pub fn last_day(self) -> NaiveDate {
        self.first + Duration::days(self.days_in_month() as i64 - 1)
    }

    pub fn days_in_month(self) -> u32 {
        match self.month() {
            4 | 6 | 9 | 11 => 30,
            2 if is_leap_year(self.year()) => 29,
            2 => 28,
            _ => 31,
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last_day()
    }

    /// The following month, rolling December into January of the next year.
    pub fn next(self) -> Result<Self, CalendarError> {
        let (year, month) = (self.year() as i64, self.month() as i64);
        if month == 12 {
            Self::new(year + 1, 1)
        } else {
            Self::new(year, month + 1)
        }
    }

    pub fn previous(self) -> Result<Self, CalendarError> {
        let (year, month) = (self.year() as i64, self.month() as i64);
        if month == 1 {
            Self::new(year - 1, 12)
        } else {
            Self::new(year, month - 1)
        }
    }

    /// Date for a grid offset. `None` only when the result leaves chrono's range.
    pub fn resolve_offset(self, offset: i32) -> Option<NaiveDate> {
        self.first
            .checked_add_signed(Duration::days(offset as i64 - 1))
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// `[0, 1, .., 6]` rotated so that `first_weekday` comes first.
pub fn weekday_order(first_weekday: Weekday) -> [Weekday; DAYS_PER_WEEK] {
    std::array::from_fn(|i| Weekday(((first_weekday.0 as usize + i) % DAYS_PER_WEEK) as u8))
}

/// Cells of the first row taken by the previous month.
fn leading_days(year_month: YearMonth, first_weekday: Weekday) -> u32 {
    let weekday_of_first = Weekday::of(year_month.first_day()).0 as u32;
    (weekday_of_first + DAYS_PER_WEEK as u32 - first_weekday.0 as u32) % DAYS_PER_WEEK as u32
}

pub fn weeks_in_month(year_month: YearMonth, first_weekday: Weekday) -> u32 {
    (leading_days(year_month, first_weekday) + year_month.days_in_month())
        .div_ceil(DAYS_PER_WEEK as u32)
}

pub fn grid_offsets(year_month: YearMonth, first_weekday: Weekday) -> Vec<[i32; DAYS_PER_WEEK]> {
    let start = 1 - leading_days(year_month, first_weekday) as i32;
    (0..weeks_in_month(year_month, first_weekday) as i32)
        .map(|week| std::array::from_fn(|day| start + week * DAYS_PER_WEEK as i32 + day as i32))
        .collect()
}

pub fn cell_id(week_index: usize, day_offset: i32) -> String {
    format!("{}-{}", week_index, day_offset)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub cell_id: String,
    pub in_displayed_month: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year_month: YearMonth,
    pub first_weekday: Weekday,
    pub weekdays: [Weekday; DAYS_PER_WEEK],
    pub weeks: Vec<Vec<CalendarCell>>,
}

impl MonthGrid {
    pub fn build(year_month: YearMonth, first_weekday: Weekday) -> Result<Self, CalendarError> {
        let weeks = grid_offsets(year_month, first_weekday)
            .into_iter()
            .enumerate()
            .map(|(week_index, offsets)| {
                offsets
                    .iter()
                    .map(|&offset| {
                        year_month
                            .resolve_offset(offset)
                            .map(|date| CalendarCell {
                                date,
                                cell_id: cell_id(week_index, offset),
                                in_displayed_month: year_month.contains(date),
                            })
                            .ok_or(CalendarError::OffsetOutOfRange(offset))
                    })
                    .collect::<Result<Vec<_>, CalendarError>>()
            })
            .collect::<Result<Vec<_>, CalendarError>>()?;

        Ok(Self {
            year_month,
            first_weekday,
            weekdays: weekday_order(first_weekday),
            weeks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ym(year: i64, month: i64) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn wd(index: i64) -> Weekday {
        Weekday::new(index).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── weekday_order ────────────────────────────────────────────────────

    #[test]
    fn test_weekday_order_sunday_first_is_identity() {
        let order: Vec<u8> = weekday_order(Weekday::SUNDAY).iter().map(|w| w.index()).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_weekday_order_is_rotation() {
        for first in 0..7 {
            let order = weekday_order(wd(first));
            assert_eq!(order[0].index() as i64, first);
            let distinct: HashSet<u8> = order.iter().map(|w| w.index()).collect();
            assert_eq!(distinct.len(), 7);
            for pair in order.windows(2) {
                assert_eq!((pair[0].index() + 1) % 7, pair[1].index());
            }
        }
    }

    #[test]
    fn test_invalid_weekday_rejected() {
        assert_eq!(Weekday::new(7), Err(CalendarError::InvalidWeekday(7)));
        assert_eq!(Weekday::new(-1), Err(CalendarError::InvalidWeekday(-1)));
    }

    // ── YearMonth ────────────────────────────────────────────────────────

    #[test]
    fn test_year_month_rejects_out_of_range() {
        assert_eq!(YearMonth::new(2024, 0), Err(CalendarError::InvalidMonth(0)));
        assert_eq!(YearMonth::new(2024, 13), Err(CalendarError::InvalidMonth(13)));
        assert_eq!(YearMonth::new(0, 5), Err(CalendarError::InvalidYear(0)));
        assert_eq!(YearMonth::new(10_000, 5), Err(CalendarError::InvalidYear(10_000)));
    }

    #[test]
    fn test_days_in_month_handles_leap_years() {
        assert_eq!(ym(2024, 2).days_in_month(), 29);
        assert_eq!(ym(2023, 2).days_in_month(), 28);
        assert_eq!(ym(1900, 2).days_in_month(), 28);
        assert_eq!(ym(2000, 2).days_in_month(), 29);
        assert_eq!(ym(2024, 4).days_in_month(), 30);
        assert_eq!(ym(2024, 12).days_in_month(), 31);
    }

    #[test]
    fn test_next_and_previous_roll_over_year() {
        assert_eq!(ym(2024, 12).next().unwrap(), ym(2025, 1));
        assert_eq!(ym(2025, 1).previous().unwrap(), ym(2024, 12));
        assert_eq!(ym(2024, 6).next().unwrap(), ym(2024, 7));
        assert!(ym(9999, 12).next().is_err());
    }

    #[test]
    fn test_year_month_of_date() {
        assert_eq!(YearMonth::of(date(2024, 3, 17)), ym(2024, 3));
        assert_eq!(YearMonth::of(date(2024, 3, 1)), ym(2024, 3));
    }

    #[test]
    fn test_resolve_offset_crosses_month_boundaries() {
        let feb = ym(2024, 2);
        assert_eq!(feb.resolve_offset(1), Some(date(2024, 2, 1)));
        assert_eq!(feb.resolve_offset(0), Some(date(2024, 1, 31)));
        assert_eq!(feb.resolve_offset(-3), Some(date(2024, 1, 28)));
        assert_eq!(feb.resolve_offset(30), Some(date(2024, 3, 1)));
    }

    // ── weeks_in_month ───────────────────────────────────────────────────

    #[test]
    fn test_four_row_february() {
        // Feb 1, 2026 is a Sunday and the month has 28 days.
        assert_eq!(weeks_in_month(ym(2026, 2), Weekday::SUNDAY), 4);
        assert_eq!(weeks_in_month(ym(2015, 2), Weekday::SUNDAY), 4);
    }

    #[test]
    fn test_six_row_month() {
        // Mar 1, 2024 is a Friday: five leading cells plus 31 days.
        assert_eq!(weeks_in_month(ym(2024, 3), Weekday::SUNDAY), 6);
        // Aug 1, 2026 is a Saturday.
        assert_eq!(weeks_in_month(ym(2026, 8), Weekday::SUNDAY), 6);
    }

    #[test]
    fn test_weeks_depend_on_first_weekday() {
        // Aug 1, 2026 (Saturday) needs only five rows when Saturday leads.
        assert_eq!(weeks_in_month(ym(2026, 8), wd(6)), 5);
        assert_eq!(weeks_in_month(ym(2026, 2), Weekday::MONDAY), 5);
    }

    // ── grid_offsets ─────────────────────────────────────────────────────

    #[test]
    fn test_february_2024_sunday_first() {
        let grid = grid_offsets(ym(2024, 2), Weekday::SUNDAY);
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[0], [-3, -2, -1, 0, 1, 2, 3]);
        assert_eq!(grid[4], [25, 26, 27, 28, 29, 30, 31]);
    }

    #[test]
    fn test_february_2024_monday_first() {
        let grid = grid_offsets(ym(2024, 2), Weekday::MONDAY);
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[0], [-2, -1, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_no_leading_spillover_when_first_matches() {
        // Sep 1, 2024 is a Sunday.
        let grid = grid_offsets(ym(2024, 9), Weekday::SUNDAY);
        assert_eq!(grid[0][0], 1);
        // Sep 2, 2024 is a Monday.
        let grid = grid_offsets(ym(2024, 9), Weekday::MONDAY);
        assert_eq!(grid[0][0], -5);
    }

    #[test]
    fn test_grid_shape_and_bounds_for_every_configuration() {
        for year in [1999, 2000, 2023, 2024, 2100] {
            for month in 1..=12 {
                for first in 0..7 {
                    let year_month = ym(year, month);
                    let first_weekday = wd(first);
                    let grid = grid_offsets(year_month, first_weekday);
                    let weeks = weeks_in_month(year_month, first_weekday);

                    assert!(weeks >= 4 && weeks <= 6);
                    assert_eq!(grid.len(), weeks as usize);
                    assert!(grid.iter().all(|row| row.len() == DAYS_PER_WEEK));

                    let first_cell = year_month.resolve_offset(grid[0][0]).unwrap();
                    let last_cell = year_month
                        .resolve_offset(grid[grid.len() - 1][DAYS_PER_WEEK - 1])
                        .unwrap();
                    assert!(first_cell <= year_month.first_day());
                    assert!(last_cell >= year_month.last_day());
                    assert_eq!(Weekday::of(first_cell), first_weekday);

                    // Neither edge row is made entirely of spillover.
                    assert!(grid[0][DAYS_PER_WEEK - 1] >= 1);
                    assert!(grid[grid.len() - 1][0] <= year_month.days_in_month() as i32);
                }
            }
        }
    }

    #[test]
    fn test_grid_offsets_idempotent() {
        let a = grid_offsets(ym(2024, 7), wd(3));
        let b = grid_offsets(ym(2024, 7), wd(3));
        assert_eq!(a, b);
    }

    // ── MonthGrid ────────────────────────────────────────────────────────

    #[test]
    fn test_month_grid_cells_resolve_dates() {
        let grid = MonthGrid::build(ym(2024, 2), Weekday::SUNDAY).unwrap();
        let first = &grid.weeks[0][0];
        assert_eq!(first.date, date(2024, 1, 28));
        assert_eq!(first.cell_id, "0--3");
        assert!(!first.in_displayed_month);

        let feb_first = &grid.weeks[0][4];
        assert_eq!(feb_first.date, date(2024, 2, 1));
        assert!(feb_first.in_displayed_month);

        let last = grid.weeks.iter().flatten().last().unwrap();
        assert_eq!(last.date, date(2024, 3, 2));
        assert!(!last.in_displayed_month);
        assert_eq!(grid.weeks.iter().flatten().filter(|c| c.in_displayed_month).count(), 29);
    }

    #[test]
    fn test_month_grid_spans_year_boundary() {
        let january = MonthGrid::build(ym(2025, 1), Weekday::SUNDAY).unwrap();
        assert_eq!(january.weeks[0][0].date, date(2024, 12, 29));

        let december = MonthGrid::build(ym(2024, 12), Weekday::SUNDAY).unwrap();
        assert_eq!(december.weeks.iter().flatten().last().unwrap().date, date(2025, 1, 4));
    }

    #[test]
    fn test_cell_ids_unique_and_stable() {
        let a = MonthGrid::build(ym(2024, 3), wd(2)).unwrap();
        let b = MonthGrid::build(ym(2024, 3), wd(2)).unwrap();
        let ids: HashSet<&str> = a.weeks.iter().flatten().map(|c| c.cell_id.as_str()).collect();
        assert_eq!(ids.len(), a.weeks.iter().flatten().count());
        assert_eq!(a, b);
    }

    #[test]
    fn test_month_grid_at_supported_year_edges() {
        // 0001-01-01 is a Monday, so the first cell falls in year 0.
        let first = MonthGrid::build(ym(1, 1), Weekday::SUNDAY).unwrap();
        assert_eq!(first.weeks[0][0].date, date(0, 12, 31));
        assert_eq!(first.weeks[0][0].cell_id, "0-0");

        let last = MonthGrid::build(ym(9999, 12), Weekday::SUNDAY).unwrap();
        let trailing = last.weeks.iter().flatten().last().unwrap();
        assert!(trailing.date >= date(9999, 12, 31));
    }

    #[test]
    fn test_resolve_offset_out_of_range() {
        assert_eq!(ym(9999, 12).resolve_offset(i32::MAX), None);
    }
}
