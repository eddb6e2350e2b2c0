//! Statistics over server performance samples.

use crate::models::tps::{TpsSample, UNMEASURED};

/// Borrowing view over fetched TPS samples with derived statistics.
///
/// Samples are expected in ascending date order, as the queries return them;
/// downtime detection depends on that ordering.
pub struct TpsMutator<'t> {
    samples: Vec<&'t TpsSample>,
}

impl<'t> TpsMutator<'t> {
    pub fn new(samples: &'t [TpsSample]) -> Self {
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

    /// Samples whose measured TPS falls in `[min, max)`.
    pub fn filter_by_tps(&self, min: f64, max: f64) -> Self {
        Self {
            samples: self
                .samples
                .iter()
                .copied()
                .filter(|s| s.tps != UNMEASURED && s.tps >= min && s.tps < max)
                .collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn average_f64(&self, value: impl Fn(&TpsSample) -> f64) -> f64 {
        let measured: Vec<f64> = self
            .samples
            .iter()
            .map(|s| value(s))
            .filter(|v| *v != UNMEASURED)
            .collect();
        if measured.is_empty() {
            UNMEASURED
        } else {
            measured.iter().sum::<f64>() / measured.len() as f64
        }
    }

    fn average_i64(&self, value: impl Fn(&TpsSample) -> i64) -> f64 {
        let measured: Vec<i64> = self
            .samples
            .iter()
            .map(|s| value(s))
            .filter(|v| *v != -1)
            .collect();
        if measured.is_empty() {
            UNMEASURED
        } else {
            measured.iter().sum::<i64>() as f64 / measured.len() as f64
        }
    }

    /// Average TPS over measured samples, -1.0 when none were measured.
    pub fn average_tps(&self) -> f64 {
        self.average_f64(|s| s.tps)
    }

    /// Average CPU percentage, -1.0 when unmeasured.
    pub fn average_cpu(&self) -> f64 {
        self.average_f64(|s| s.cpu_usage)
    }

    /// Average RAM usage in bytes, -1.0 when unmeasured.
    pub fn average_ram(&self) -> f64 {
        self.average_i64(|s| s.ram_usage)
    }

    pub fn average_entities(&self) -> f64 {
        self.average_i64(|s| s.entities as i64)
    }

    pub fn average_chunks(&self) -> f64 {
        self.average_i64(|s| s.chunks_loaded as i64)
    }

    pub fn average_players_online(&self) -> f64 {
        self.average_i64(|s| s.players_online as i64)
    }

    /// Number of samples with a measured TPS below `threshold`.
    pub fn low_tps_spike_count(&self, threshold: f64) -> usize {
        self.samples
            .iter()
            .filter(|s| s.tps != UNMEASURED && s.tps < threshold)
            .count()
    }

    /// Total downtime derived from gaps between consecutive samples.
    ///
    /// A gap longer than `max_interval_ms` means the server was off for
    /// `gap - max_interval_ms` (one interval is the expected spacing).
    /// A continuous series yields 0.
    pub fn server_down_time(&self, max_interval_ms: i64) -> i64 {
        let mut downtime = 0;
        for pair in self.samples.windows(2) {
            let gap = pair[1].date - pair[0].date;
            if gap > max_interval_ms {
                downtime += gap - max_interval_ms;
            }
        }
        downtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::time::MINUTE_MS;

    fn sample(date: i64, tps: f64, players: i32) -> TpsSample {
        TpsSample {
            date,
            tps,
            players_online: players,
            cpu_usage: 10.0,
            ram_usage: 2048,
            entities: 100,
            chunks_loaded: 50,
            free_disk: 1 << 30,
        }
    }

    #[test]
    fn gap_counts_as_downtime_minus_one_interval() {
        // Samples every minute, then a 40 minute hole.
        let mut samples = vec![sample(0, 20.0, 1), sample(MINUTE_MS, 20.0, 1)];
        samples.push(sample(MINUTE_MS + 40 * MINUTE_MS, 20.0, 1));

        let downtime = TpsMutator::new(&samples).server_down_time(MINUTE_MS);
        assert_eq!(downtime, 39 * MINUTE_MS);
    }

    #[test]
    fn continuous_series_has_no_downtime() {
        let samples: Vec<TpsSample> = (0..60)
            .map(|i| sample(i * MINUTE_MS, 19.5, 3))
            .collect();
        assert_eq!(TpsMutator::new(&samples).server_down_time(MINUTE_MS), 0);
    }

    #[test]
    fn unmeasured_values_do_not_drag_averages() {
        let samples = vec![sample(0, -1.0, 0), sample(1, 18.0, 0), sample(2, 20.0, 0)];
        assert_eq!(TpsMutator::new(&samples).average_tps(), 19.0);
    }

    #[test]
    fn all_unmeasured_averages_to_sentinel() {
        let samples = vec![sample(0, -1.0, 0)];
        assert_eq!(TpsMutator::new(&samples).average_tps(), UNMEASURED);
        assert_eq!(TpsMutator::new(&[]).average_tps(), UNMEASURED);
    }

    #[test]
    fn low_tps_spikes_ignore_unmeasured() {
        let samples = vec![
            sample(0, -1.0, 0),
            sample(1, 12.0, 0),
            sample(2, 19.0, 0),
            sample(3, 8.5, 0),
        ];
        assert_eq!(TpsMutator::new(&samples).low_tps_spike_count(18.0), 2);
    }

    #[test]
    fn tps_value_filter_skips_unmeasured() {
        let samples = vec![
            sample(0, -1.0, 0),
            sample(1, 12.0, 0),
            sample(2, 19.0, 0),
            sample(3, 20.0, 0),
        ];
        let mutator = TpsMutator::new(&samples);
        assert_eq!(mutator.filter_by_tps(0.0, 20.0).count(), 2);
        assert_eq!(mutator.filter_by_tps(19.0, 25.0).count(), 2);
    }

    #[test]
    fn range_filter_is_half_open() {
        let samples = vec![sample(0, 20.0, 0), sample(10, 20.0, 0), sample(20, 20.0, 0)];
        let mutator = TpsMutator::new(&samples);
        assert_eq!(mutator.filter_by_range(0, 20).count(), 2);
        assert_eq!(mutator.filter_by_range(10, 21).count(), 2);
    }
}
