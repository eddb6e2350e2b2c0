//! Division-safe arithmetic helpers shared by queries and builders.

/// Percentage calculation that never divides by zero.
pub struct Percentage;

impl Percentage {
    /// Returns `numerator / denominator * 100`, or `fallback` when the
    /// denominator is 0. Conventionally `fallback` is -1.0.
    pub fn calculate(numerator: f64, denominator: f64, fallback: f64) -> f64 {
        if denominator == 0.0 {
            fallback
        } else {
            numerator / denominator * 100.0
        }
    }
}

/// Kill/death ratio. Zero deaths yields the kill count, not a division error.
pub fn kdr(kills: i64, deaths: i64) -> f64 {
    if deaths == 0 {
        kills as f64
    } else {
        kills as f64 / deaths as f64
    }
}

/// Median of an unsorted slice: midpoint for odd lengths, average of the two
/// middle values for even lengths, 0 for empty input.
pub fn median(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_falls_back_on_zero_denominator() {
        assert_eq!(Percentage::calculate(5.0, 0.0, -1.0), -1.0);
        assert_eq!(Percentage::calculate(1.0, 4.0, -1.0), 25.0);
    }

    #[test]
    fn kdr_with_zero_deaths_is_kill_count() {
        assert_eq!(kdr(5, 0), 5.0);
        assert_eq!(kdr(6, 3), 2.0);
        assert_eq!(kdr(0, 0), 0.0);
    }

    #[test]
    fn median_odd_and_even_counts() {
        assert_eq!(median(&[10, 20, 30]), 20.0);
        assert_eq!(median(&[10, 20, 30, 40]), 25.0);
        assert_eq!(median(&[30, 10, 20]), 20.0);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[7]), 7.0);
    }
}
