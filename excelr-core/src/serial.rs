//! Excel date serials (1900 date system).
//!
//! Day 1 is 1900-01-01. Excel also counts a 1900-02-29 that never existed, so every
//! date from 1900-03-01 on is one day ahead of the true day count. That quirk is kept
//! as-is; readers subtract it again when converting back.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Serial of the phantom 1900-02-29.
const PHANTOM_LEAP_DAY: i64 = 60;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 31).unwrap_or(NaiveDate::MIN)
}

/// Whole-day serial for a date.
pub fn date_serial(date: NaiveDate) -> i64 {
    let days = date.signed_duration_since(epoch()).num_days();
    if days >= PHANTOM_LEAP_DAY {
        days + 1
    } else {
        days
    }
}

/// Fraction of a day for a time of day, truncated to whole seconds.
pub fn time_fraction(time: NaiveTime) -> f64 {
    f64::from(time.num_seconds_from_midnight()) / SECONDS_PER_DAY
}

/// Serial for a combined date and time.
pub fn datetime_serial(dt: NaiveDateTime) -> f64 {
    date_serial(dt.date()) as f64 + time_fraction(dt.time())
}
