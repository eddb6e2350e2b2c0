//! Statistics over a set of sessions.

use shared::time::{days_in, overlap_ms};

use crate::models::{PlayerKill, Session, WorldTimes};

use super::math::median;

/// Borrowing view over fetched sessions with derived statistics.
///
/// All methods are pure; filtering returns a new mutator over the matching
/// subset so computations chain without re-fetching.
pub struct SessionsMutator<'s> {
    sessions: Vec<&'s Session>,
}

impl<'s> SessionsMutator<'s> {
    pub fn new(sessions: &'s [Session]) -> Self {
        Self {
            sessions: sessions.iter().collect(),
        }
    }

    /// Sessions overlapping `[from, to)`.
    pub fn filter_by_range(&self, from: i64, to: i64) -> Self {
        Self {
            sessions: self
                .sessions
                .iter()
                .copied()
                .filter(|s| s.overlaps(from, to))
                .collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Total session length in ms.
    pub fn total_playtime(&self) -> i64 {
        self.sessions.iter().map(|s| s.length()).sum()
    }

    /// Playtime clamped to `[from, to)`, matching the SQL playtime query:
    /// each session contributes `min(end,to) - max(start,from)`, at least 0.
    pub fn playtime_in(&self, from: i64, to: i64) -> i64 {
        self.sessions
            .iter()
            .map(|s| overlap_ms(s.start, s.end, from, to))
            .sum()
    }

    /// Total non-AFK playtime in ms.
    pub fn active_playtime(&self) -> i64 {
        self.sessions.iter().map(|s| s.active_ms()).sum()
    }

    /// Total AFK time in ms.
    pub fn afk_time(&self) -> i64 {
        self.sessions.iter().map(|s| s.afk_ms).sum()
    }

    /// Average session length in ms, 0 when empty.
    pub fn average_length(&self) -> i64 {
        if self.sessions.is_empty() {
            0
        } else {
            self.total_playtime() / self.sessions.len() as i64
        }
    }

    /// Median session length in ms, 0 when empty.
    pub fn median_length(&self) -> f64 {
        let lengths: Vec<i64> = self.sessions.iter().map(|s| s.length()).collect();
        median(&lengths)
    }

    /// Longest session length in ms, 0 when empty.
    pub fn longest(&self) -> i64 {
        self.sessions.iter().map(|s| s.length()).max().unwrap_or(0)
    }

    /// Average playtime per day over `[from, to)`.
    pub fn average_playtime_per_day(&self, from: i64, to: i64) -> i64 {
        self.playtime_in(from, to) / days_in(from, to)
    }

    pub fn player_kill_count(&self) -> i64 {
        self.sessions
            .iter()
            .map(|s| s.player_kill_count() as i64)
            .sum()
    }

    pub fn mob_kill_count(&self) -> i64 {
        self.sessions.iter().map(|s| s.mob_kills as i64).sum()
    }

    pub fn death_count(&self) -> i64 {
        self.sessions.iter().map(|s| s.deaths as i64).sum()
    }

    /// All kill events across the sessions, unsorted.
    pub fn player_kills(&self) -> Vec<&'s PlayerKill> {
        self.sessions
            .iter()
            .flat_map(|s| s.player_kills.iter())
            .collect()
    }

    /// Combined per-world, per-gamemode breakdown of all sessions.
    pub fn world_times(&self) -> WorldTimes {
        let mut combined = WorldTimes::new();
        for session in &self.sessions {
            combined.merge(&session.world_times);
        }
        combined
    }

    /// Start of the most recent session, if any.
    pub fn latest_start(&self) -> Option<i64> {
        self.sessions.iter().map(|s| s.start).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameMode;
    use shared::time::DAY_MS;
    use uuid::Uuid;

    fn session(start: i64, end: i64, afk: i64) -> Session {
        Session {
            player: Uuid::new_v4(),
            server: Uuid::new_v4(),
            start,
            end,
            afk_ms: afk,
            deaths: 1,
            mob_kills: 2,
            world_times: WorldTimes::new(),
            player_kills: Vec::new(),
        }
    }

    #[test]
    fn median_lengths_odd_and_even() {
        let sessions = vec![session(0, 10, 0), session(0, 20, 0), session(0, 30, 0)];
        assert_eq!(SessionsMutator::new(&sessions).median_length(), 20.0);

        let sessions = vec![
            session(0, 10, 0),
            session(0, 20, 0),
            session(0, 30, 0),
            session(0, 40, 0),
        ];
        assert_eq!(SessionsMutator::new(&sessions).median_length(), 25.0);
    }

    #[test]
    fn playtime_in_is_additive_across_a_split() {
        let sessions = vec![
            session(1_000, 5_000, 0),
            session(6_000, 9_000, 0),
            session(2_000, 8_000, 0),
        ];
        let mutator = SessionsMutator::new(&sessions);
        let (from, mid, to) = (0, 4_500, 10_000);
        assert_eq!(
            mutator.playtime_in(from, mid) + mutator.playtime_in(mid, to),
            mutator.playtime_in(from, to)
        );
    }

    #[test]
    fn active_and_afk_split() {
        let sessions = vec![session(0, 4_000, 500), session(0, 1_000, 250)];
        let mutator = SessionsMutator::new(&sessions);
        assert_eq!(mutator.total_playtime(), 5_000);
        assert_eq!(mutator.afk_time(), 750);
        assert_eq!(mutator.active_playtime(), 4_250);
    }

    #[test]
    fn filter_by_range_keeps_overlapping_only() {
        let sessions = vec![session(0, 1_000, 0), session(5_000, 6_000, 0)];
        let mutator = SessionsMutator::new(&sessions);
        assert_eq!(mutator.filter_by_range(4_000, 7_000).count(), 1);
        assert_eq!(mutator.filter_by_range(2_000, 3_000).count(), 0);
    }

    #[test]
    fn average_per_day_divides_by_days() {
        let sessions = vec![session(0, 2 * DAY_MS, 0)];
        let mutator = SessionsMutator::new(&sessions);
        assert_eq!(
            mutator.average_playtime_per_day(0, 4 * DAY_MS),
            2 * DAY_MS / 4
        );
    }

    #[test]
    fn combined_world_times() {
        let mut a = session(0, 100, 0);
        a.world_times.add("world", GameMode::Survival, 60);
        let mut b = session(0, 100, 0);
        b.world_times.add("world", GameMode::Survival, 40);
        let sessions = vec![a, b];
        let combined = SessionsMutator::new(&sessions).world_times();
        assert_eq!(combined.world("world").unwrap().survival, 100);
    }
}
