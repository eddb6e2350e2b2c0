//! Epoch-millisecond time arithmetic.
//!
//! All timestamps in Playtrack are 64-bit epoch milliseconds and all
//! time-scoped queries use half-open `[from, to)` intervals.

use chrono::{DateTime, TimeZone, Utc};

/// One second in milliseconds.
pub const SECOND_MS: i64 = 1_000;
/// One minute in milliseconds.
pub const MINUTE_MS: i64 = 60 * SECOND_MS;
/// One hour in milliseconds.
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * HOUR_MS;
/// One week in milliseconds.
pub const WEEK_MS: i64 = 7 * DAY_MS;
/// One 30-day month in milliseconds, used for "last month" windows.
pub const MONTH_MS: i64 = 30 * DAY_MS;

/// Current time as epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Converts epoch milliseconds to a UTC datetime.
///
/// Returns `None` for values outside chrono's representable range.
pub fn to_datetime(epoch_ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(epoch_ms).single()
}

/// Length of the overlap between `[start, end)` and `[from, to)` in ms.
///
/// Non-overlapping ranges contribute 0, never a negative value.
pub fn overlap_ms(start: i64, end: i64, from: i64, to: i64) -> i64 {
    (end.min(to) - start.max(from)).max(0)
}

/// Number of whole days covered by `[from, to)`, at least 1.
///
/// Per-day averages divide by this, so a window shorter than a day still
/// averages over one day instead of dividing by zero.
pub fn days_in(from: i64, to: i64) -> i64 {
    ((to - from) / DAY_MS).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_clamps_to_window() {
        assert_eq!(overlap_ms(1_000, 5_000, 0, 10_000), 4_000);
        assert_eq!(overlap_ms(1_000, 5_000, 2_000, 4_000), 2_000);
        assert_eq!(overlap_ms(1_000, 5_000, 4_000, 10_000), 1_000);
    }

    #[test]
    fn overlap_outside_window_is_zero() {
        assert_eq!(overlap_ms(1_000, 5_000, 6_000, 10_000), 0);
        assert_eq!(overlap_ms(6_000, 10_000, 1_000, 5_000), 0);
    }

    #[test]
    fn days_in_short_window_is_one() {
        assert_eq!(days_in(0, HOUR_MS), 1);
        assert_eq!(days_in(0, 3 * DAY_MS), 3);
    }
}
