//! Trailing time windows for history and health queries.

use chrono::{DateTime, Duration, Utc};

/// Start of the window of length `span` that ends at `now`.
///
/// Nothing is ever recorded before the Unix epoch, so windows reaching
/// further back start there instead of overflowing.
#[must_use]
pub fn window_start(now: DateTime<Utc>, span: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(span)
        .filter(|start| *start > DateTime::UNIX_EPOCH)
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Start of the trailing `days`-day window ending at `now`.
#[must_use]
pub fn trailing_days(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    window_start(now, Duration::days(i64::from(days)))
}

/// Start of the trailing `hours`-hour window ending at `now`.
#[must_use]
pub fn trailing_hours(now: DateTime<Utc>, hours: u32) -> DateTime<Utc> {
    window_start(now, Duration::hours(i64::from(hours)))
}
