//! Responses-per-day histogram for an entry's feedback view.
//!
//! The database groups submissions by UTC calendar date and only returns days
//! that have at least one submission. [`fill_daily_counts`] turns that sparse
//! list into one point per day of the window.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Number of days covered, ending today inclusive.
pub const HISTOGRAM_DAYS: i64 = 30;

/// Submission count for one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// First day of a `days`-long window ending on `today`.
pub fn window_start(today: NaiveDate, days: i64) -> NaiveDate {
    today - Duration::days(days.max(1) - 1)
}

/// Expand sparse `(date, count)` rows into a chronological, zero-filled
/// series covering `window_start(today, days) ..= today`.
///
/// Rows outside the window are ignored; duplicate dates are summed.
pub fn fill_daily_counts(today: NaiveDate, days: i64, rows: &[(NaiveDate, i64)]) -> Vec<DailyCount> {
    let mut by_date: HashMap<NaiveDate, i64> = HashMap::with_capacity(rows.len());
    for (date, count) in rows {
        *by_date.entry(*date).or_default() += count;
    }

    let start = window_start(today, days);
    start
        .iter_days()
        .take_while(|d| *d <= today)
        .map(|date| DailyCount {
            date,
            count: by_date.get(&date).copied().unwrap_or(0),
        })
        .collect()
}
