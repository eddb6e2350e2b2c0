//! Statistics over ping samples.

use crate::models::PingSample;

pub struct PingMutator<'p> {
    samples: Vec<&'p PingSample>,
}

impl<'p> PingMutator<'p> {
    pub fn new(samples: &'p [PingSample]) -> Self {
        Self {
            samples: samples.iter().collect(),
        }
    }

    /// Samples with `date` in `[from, to)`.
    pub fn filter_by_range(&self, from: i64, to: i64) -> Self {
        Self {
            samples: self
                .samples
                .iter()
                .copied()
                .filter(|s| s.date >= from && s.date < to)
                .collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Mean of window averages, -1.0 when there are no samples.
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return -1.0;
        }
        self.samples.iter().map(|s| s.avg_ms).sum::<f64>() / self.samples.len() as f64
    }

    /// Best (lowest) minimum across windows, -1 when empty.
    pub fn min(&self) -> i32 {
        self.samples.iter().map(|s| s.min_ms).min().unwrap_or(-1)
    }

    /// Worst (highest) maximum across windows, -1 when empty.
    pub fn max(&self) -> i32 {
        self.samples.iter().map(|s| s.max_ms).max().unwrap_or(-1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ping(date: i64, min: i32, max: i32, avg: f64) -> PingSample {
        PingSample {
            player: Uuid::new_v4(),
            server: Uuid::new_v4(),
            date,
            min_ms: min,
            max_ms: max,
            avg_ms: avg,
        }
    }

    #[test]
    fn aggregates_across_windows() {
        let samples = vec![ping(0, 20, 90, 40.0), ping(1, 30, 150, 60.0)];
        let mutator = PingMutator::new(&samples);
        assert_eq!(mutator.average(), 50.0);
        assert_eq!(mutator.min(), 20);
        assert_eq!(mutator.max(), 150);
    }

    #[test]
    fn empty_input_yields_sentinels() {
        let mutator = PingMutator::new(&[]);
        assert_eq!(mutator.average(), -1.0);
        assert_eq!(mutator.min(), -1);
        assert_eq!(mutator.max(), -1);
    }
}
