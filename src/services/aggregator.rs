//! # Daily aggregator
//!
//! Reduces a user's log entries to what the month view shows: one
//! representative entry per civil day and month-level totals.
//!
//! Timestamps are parsed here rather than at insert time, so rows with a
//! timestamp that cannot be read, or with a negative or non-finite quantity,
//! are dropped and reported in [`MonthEntries::skipped`]. One bad row never
//! hides the rest of the month.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::models::journal_entry::LogEntry;
use crate::services::calendar::YearMonth;

/// `top_emotion` when a month has no entries.
pub const NO_DATA: &str = "—";

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    // en-US `toLocaleString`, 12-hour and 24-hour clocks.
    "%m/%d/%Y, %I:%M:%S %p",
    "%m/%d/%Y, %H:%M:%S",
];

/// Parse a stored timestamp into local wall-clock time.
///
/// RFC 3339 values carry their own offset and are shifted into `offset`.
/// Values without an offset are taken as already local. A bare date means
/// midnight.
pub fn parse_timestamp(raw: &str, offset: FixedOffset) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&offset).naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "field", rename_all = "snake_case")]
pub enum SkipReason {
    UnparseableTimestamp,
    InvalidQuantity(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub id: Uuid,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// An entry paired with its parsed local time.
#[derive(Debug, Clone, Copy)]
pub struct DatedEntry<'a> {
    pub at: NaiveDateTime,
    pub entry: &'a LogEntry,
}

impl DatedEntry<'_> {
    pub fn day(&self) -> NaiveDate {
        self.at.date()
    }
}

#[derive(Debug, Default)]
pub struct MonthEntries<'a> {
    pub entries: Vec<DatedEntry<'a>>,
    pub skipped: Vec<SkippedEntry>,
}

fn invalid_quantity(entry: &LogEntry) -> Option<&'static str> {
    [
        ("water", entry.water),
        ("sleep", entry.sleep),
        ("outdoors", entry.outdoors),
        ("activity", entry.activity),
        ("eating_out_cost", entry.eating_out_cost),
    ]
    .into_iter()
    .find(|(_, value)| !value.is_finite() || *value < 0.0)
    .map(|(field, _)| field)
}

/// Keep entries whose local date falls in `year_month`.
///
/// Unparseable timestamps are always counted as skipped, since they cannot
/// be placed in any month. Invalid quantities only count when the entry
/// belongs to the requested month.
pub fn filter_to_month(
    entries: &[LogEntry],
    year_month: YearMonth,
    offset: FixedOffset,
) -> MonthEntries<'_> {
    let mut month = MonthEntries::default();

    for entry in entries {
        let Some(at) = parse_timestamp(&entry.timestamp, offset) else {
            month.skipped.push(SkippedEntry {
                id: entry.id,
                reason: SkipReason::UnparseableTimestamp,
            });
            continue;
        };
        if !year_month.contains(at.date()) {
            continue;
        }
        if let Some(field) = invalid_quantity(entry) {
            month.skipped.push(SkippedEntry {
                id: entry.id,
                reason: SkipReason::InvalidQuantity(field),
            });
            continue;
        }
        month.entries.push(DatedEntry { at, entry });
    }

    month
}

/// Collapse each civil day to its most recent entry.
///
/// Entries with identical timestamps resolve to the one that appears last
/// in `entries`.
pub fn latest_per_day<'a>(entries: &[DatedEntry<'a>]) -> BTreeMap<NaiveDate, DatedEntry<'a>> {
    let mut days: BTreeMap<NaiveDate, DatedEntry<'a>> = BTreeMap::new();
    for dated in entries {
        days.entry(dated.day())
            .and_modify(|current| {
                if dated.at >= current.at {
                    *current = *dated;
                }
            })
            .or_insert(*dated);
    }
    days
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub water: f64,
    pub sleep: f64,
    pub outdoors: f64,
    pub activity: f64,
    pub eating_out_cost: f64,
    pub top_emotion: String,
    pub entry_count: usize,
}

/// Sums and most frequent emotion over every entry passed in.
///
/// Dining cost only counts for entries not cooked at home. Emotions that
/// tie on count resolve to the one seen first.
pub fn monthly_totals(entries: &[DatedEntry<'_>]) -> MonthlyTotals {
    let mut totals = MonthlyTotals {
        water: 0.0,
        sleep: 0.0,
        outdoors: 0.0,
        activity: 0.0,
        eating_out_cost: 0.0,
        top_emotion: NO_DATA.to_string(),
        entry_count: entries.len(),
    };
    let mut emotion_counts: Vec<(&str, usize)> = Vec::new();

    for DatedEntry { entry, .. } in entries {
        totals.water += entry.water;
        totals.sleep += entry.sleep;
        totals.outdoors += entry.outdoors;
        totals.activity += entry.activity;
        if !entry.cooked_at_home {
            totals.eating_out_cost += entry.eating_out_cost;
        }

        let label = entry.emotion.trim();
        if label.is_empty() {
            continue;
        }
        match emotion_counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => emotion_counts.push((label, 1)),
        }
    }

    let mut top: Option<(&str, usize)> = None;
    for &(label, count) in &emotion_counts {
        if top.map_or(true, |(_, best)| count > best) {
            top = Some((label, count));
        }
    }
    if let Some((label, _)) = top {
        totals.top_emotion = label.to_string();
    }

    totals
}

#[derive(Debug)]
pub struct MonthSummary<'a> {
    pub days: BTreeMap<NaiveDate, DatedEntry<'a>>,
    pub totals: MonthlyTotals,
    pub skipped: Vec<SkippedEntry>,
}

pub fn summarize_month(
    entries: &[LogEntry],
    year_month: YearMonth,
    offset: FixedOffset,
) -> MonthSummary<'_> {
    let month = filter_to_month(entries, year_month, offset);
    MonthSummary {
        days: latest_per_day(&month.entries),
        totals: monthly_totals(&month.entries),
        skipped: month.skipped,
    }
}
