//! Human-readable formatting for durations and metric values.
//!
//! Trend magnitudes and report fields are formatted here so that every
//! consumer renders the same text for the same value.

use crate::time::{DAY_MS, HOUR_MS, MINUTE_MS, SECOND_MS};

/// Formats a millisecond duration as `1d 2h 3m 4s`.
///
/// Zero and negative durations format as `0s`. Leading zero units are
/// omitted (`90s` -> `1m 30s`, not `0d 0h 1m 30s`).
pub fn duration_ms(ms: i64) -> String {
    if ms <= 0 {
        return "0s".to_string();
    }
    let days = ms / DAY_MS;
    let hours = (ms % DAY_MS) / HOUR_MS;
    let minutes = (ms % HOUR_MS) / MINUTE_MS;
    let seconds = (ms % MINUTE_MS) / SECOND_MS;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days}d "));
    }
    if hours > 0 || !out.is_empty() {
        out.push_str(&format!("{hours}h "));
    }
    if minutes > 0 || !out.is_empty() {
        out.push_str(&format!("{minutes}m "));
    }
    out.push_str(&format!("{seconds}s"));
    out
}

/// Formats a float with two decimals, trimming `-0.00` to `0.00`.
pub fn decimal(value: f64) -> String {
    let s = format!("{value:.2}");
    if s == "-0.00" {
        "0.00".to_string()
    } else {
        s
    }
}

/// Formats a percentage value (already 0-100 scaled) as `42.5%`.
pub fn percentage(value: f64) -> String {
    format!("{value:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_full_duration() {
        let ms = DAY_MS + 2 * HOUR_MS + 3 * MINUTE_MS + 4 * SECOND_MS;
        assert_eq!(duration_ms(ms), "1d 2h 3m 4s");
    }

    #[test]
    fn omits_leading_zero_units() {
        assert_eq!(duration_ms(90 * SECOND_MS), "1m 30s");
        assert_eq!(duration_ms(HOUR_MS), "1h 0m 0s");
    }

    #[test]
    fn zero_and_negative_are_zero_seconds() {
        assert_eq!(duration_ms(0), "0s");
        assert_eq!(duration_ms(-5), "0s");
    }

    #[test]
    fn decimal_normalizes_negative_zero() {
        assert_eq!(decimal(-0.0001), "0.00");
        assert_eq!(decimal(19.955), "19.95");
    }

    #[test]
    fn percentage_one_decimal() {
        assert_eq!(percentage(42.55), "42.5%");
    }
}
