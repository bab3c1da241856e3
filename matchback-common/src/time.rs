//! Timestamp and UTC calendar utilities

use chrono::{DateTime, Datelike, Utc};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time as epoch milliseconds, used as a default batch timestamp
pub fn epoch_millis_now() -> i64 {
    Utc::now().timestamp_millis()
}

/// True when both instants fall in the same UTC calendar year and month
pub fn same_utc_month(a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Fractional days elapsed from `from` to `to` (negative if `to` is earlier)
pub fn days_between(from: &DateTime<Utc>, to: &DateTime<Utc>) -> f64 {
    (*to - *from).num_milliseconds() as f64 / MILLIS_PER_DAY
}
