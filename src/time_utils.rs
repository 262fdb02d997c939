// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and week keys.

use chrono::{DateTime, Datelike, Days, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Monday of the week containing `today`, shifted by `offset` weeks.
///
/// Sunday belongs to the week that started six days earlier.
pub fn resolve_week_key(today: NaiveDate, offset: i64) -> NaiveDate {
    let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
    let shift = offset.saturating_mul(7);
    let shifted = if shift >= 0 {
        monday.checked_add_days(Days::new(shift.unsigned_abs()))
    } else {
        monday.checked_sub_days(Days::new(shift.unsigned_abs()))
    };
    shifted.unwrap_or(monday)
}

/// Week key for "now" in UTC.
pub fn current_week_key(offset: i64) -> NaiveDate {
    resolve_week_key(Utc::now().date_naive(), offset)
}
