//! Date normalization for model-extracted project dates.
//!
//! The model returns ISO `YYYY-MM-DD` strings interpreted under a reference
//! period, so an end date mentioned without a year can land before the start
//! date ("empieza en noviembre, termina en febrero"). The fix is a single
//! one-year rollover of the end date, never iterated.

use chrono::{Datelike, NaiveDate};

/// Parse a model-produced date string. Strict `YYYY-MM-DD`; anything else is
/// `None`.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Apply the rollover rule: when both dates are present and the end does not
/// come after the start, push the end date forward exactly one year.
///
/// Applied once. If the ordering is still wrong after one addition the dates
/// are left as-is, matching the source behavior this replaces.
pub fn normalize_dates(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match (start, end) {
        (Some(s), Some(e)) if e <= s => (Some(s), Some(add_one_year(e))),
        other => other,
    }
}

/// Feb 29 in a leap year has no direct successor; clamp to Feb 28.
fn add_one_year(date: NaiveDate) -> NaiveDate {
    date.with_year(date.year() + 1)
        .or_else(|| NaiveDate::from_ymd_opt(date.year() + 1, 2, 28))
        .unwrap_or(date)
}
