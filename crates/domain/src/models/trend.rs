//! Before/after metric comparisons.

use serde::{Deserialize, Serialize};

use shared::format;

/// Direction of a trend. Serialized as `"+"` / `"-"`; absent when the two
/// snapshots are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    #[serde(rename = "+")]
    Up,
    #[serde(rename = "-")]
    Down,
}

/// Comparison of two numeric snapshots of the same metric.
///
/// `reversed` marks metrics where an increase is undesirable (e.g. downtime).
/// It only affects how a consumer colors the result; the computed magnitude
/// and direction are identical either way, and the flag survives
/// serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub magnitude: String,
    pub direction: Option<TrendDirection>,
    pub reversed: bool,
}

impl Trend {
    fn direction_of<T: PartialOrd>(before: &T, after: &T) -> Option<TrendDirection> {
        if after > before {
            Some(TrendDirection::Up)
        } else if after < before {
            Some(TrendDirection::Down)
        } else {
            None
        }
    }

    /// Trend between two counts.
    pub fn of_count(before: i64, after: i64, reversed: bool) -> Self {
        Self {
            magnitude: (after - before).abs().to_string(),
            direction: Self::direction_of(&before, &after),
            reversed,
        }
    }

    /// Trend between two millisecond durations, formatted as a duration.
    pub fn of_duration_ms(before: i64, after: i64, reversed: bool) -> Self {
        Self {
            magnitude: format::duration_ms((after - before).abs()),
            direction: Self::direction_of(&before, &after),
            reversed,
        }
    }

    /// Trend between two decimal values, formatted with two decimals.
    pub fn of_decimal(before: f64, after: f64, reversed: bool) -> Self {
        Self {
            magnitude: format::decimal((after - before).abs()),
            direction: Self::direction_of(&before, &after),
            reversed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_snapshots_have_no_direction() {
        let trend = Trend::of_count(5, 5, false);
        assert_eq!(trend.direction, None);
        assert_eq!(trend.magnitude, "0");
    }

    #[test]
    fn magnitude_is_absolute_difference() {
        let up = Trend::of_count(3, 10, false);
        assert_eq!(up.direction, Some(TrendDirection::Up));
        assert_eq!(up.magnitude, "7");

        let down = Trend::of_count(10, 3, false);
        assert_eq!(down.direction, Some(TrendDirection::Down));
        assert_eq!(down.magnitude, "7");
    }

    #[test]
    fn reversed_does_not_change_values() {
        let plain = Trend::of_decimal(1.0, 2.5, false);
        let reversed = Trend::of_decimal(1.0, 2.5, true);
        assert_eq!(plain.magnitude, reversed.magnitude);
        assert_eq!(plain.direction, reversed.direction);
        assert!(reversed.reversed);
    }

    #[test]
    fn reversed_survives_serialization() {
        let trend = Trend::of_duration_ms(1_000, 61_000, true);
        let json = serde_json::to_string(&trend).unwrap();
        let back: Trend = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trend);
        assert!(back.reversed);
        assert_eq!(back.direction, Some(TrendDirection::Up));
    }
}
