//! Activity index computation.
//!
//! The index looks at the three most recent weeks before `date` and scores
//! each week from three components:
//! - playtime against the configured active-play threshold (weight 0.5)
//! - session count against a two-sessions-per-week baseline (weight 0.3)
//! - recency of the last session within the whole three-week window
//!   (weight 0.2)
//!
//! Each component is capped at 1.0, the weighted sum is scaled to `[0, 5]`
//! and averaged over the three weeks.

use shared::time::WEEK_MS;

use crate::models::{ActivityIndex, Session};

use super::sessions_mutator::SessionsMutator;

const PLAYTIME_WEIGHT: f64 = 0.5;
const SESSION_WEIGHT: f64 = 0.3;
const RECENCY_WEIGHT: f64 = 0.2;
const SESSIONS_PER_WEEK_BASELINE: f64 = 2.0;

fn capped(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Computes the activity index for a player's sessions as of `date`.
///
/// `playtime_threshold_ms` is the configured weekly active-play threshold;
/// a player reaching it every week with regular sessions scores 5.0. A
/// non-positive threshold yields the inactive score.
pub fn activity_index(
    sessions: &[Session],
    date: i64,
    playtime_threshold_ms: i64,
) -> ActivityIndex {
    if playtime_threshold_ms <= 0 {
        return ActivityIndex { score: 0.0 };
    }

    let mutator = SessionsMutator::new(sessions);
    let window_start = date - 3 * WEEK_MS;
    let recency = match mutator.filter_by_range(window_start, date).latest_start() {
        Some(last_start) => capped((last_start - window_start) as f64 / (3 * WEEK_MS) as f64),
        None => 0.0,
    };

    let mut score = 0.0;
    for week in 0..3 {
        let to = date - week * WEEK_MS;
        let from = to - WEEK_MS;
        let weekly = mutator.filter_by_range(from, to);

        let playtime_part =
            capped(weekly.playtime_in(from, to) as f64 / playtime_threshold_ms as f64);
        let session_part = capped(weekly.count() as f64 / SESSIONS_PER_WEEK_BASELINE);

        score += 5.0
            * (PLAYTIME_WEIGHT * playtime_part
                + SESSION_WEIGHT * session_part
                + RECENCY_WEIGHT * recency);
    }

    ActivityIndex { score: score / 3.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityGroup, WorldTimes};
    use shared::time::{DAY_MS, HOUR_MS};
    use uuid::Uuid;

    fn session(start: i64, end: i64) -> Session {
        Session {
            player: Uuid::new_v4(),
            server: Uuid::new_v4(),
            start,
            end,
            afk_ms: 0,
            deaths: 0,
            mob_kills: 0,
            world_times: WorldTimes::new(),
            player_kills: Vec::new(),
        }
    }

    const THRESHOLD: i64 = 5 * HOUR_MS;

    #[test]
    fn no_sessions_is_inactive() {
        let index = activity_index(&[], 10 * WEEK_MS, THRESHOLD);
        assert_eq!(index.score, 0.0);
        assert_eq!(index.group(), ActivityGroup::Inactive);
    }

    #[test]
    fn threshold_playtime_every_week_is_active() {
        let now = 10 * WEEK_MS;
        let mut sessions = Vec::new();
        // Two long sessions per week for three weeks, each pair over the
        // threshold, last session one day before `now`.
        for week in 0..3 {
            let base = now - week * WEEK_MS - DAY_MS;
            sessions.push(session(base - 3 * HOUR_MS, base));
            sessions.push(session(base - DAY_MS - 3 * HOUR_MS, base - DAY_MS));
        }
        let index = activity_index(&sessions, now, THRESHOLD);
        assert!(index.score >= 3.0, "score was {}", index.score);
        assert_eq!(index.group(), ActivityGroup::Active);
    }

    #[test]
    fn single_old_short_session_is_irregular_at_best() {
        let now = 10 * WEEK_MS;
        let sessions = vec![session(now - 3 * WEEK_MS + HOUR_MS, now - 3 * WEEK_MS + 2 * HOUR_MS)];
        let index = activity_index(&sessions, now, THRESHOLD);
        assert!(index.score < 1.5, "score was {}", index.score);
    }

    #[test]
    fn score_stays_in_range() {
        let now = 10 * WEEK_MS;
        let sessions: Vec<Session> = (0..200)
            .map(|i| session(now - i * HOUR_MS * 2 - HOUR_MS, now - i * HOUR_MS * 2))
            .collect();
        let index = activity_index(&sessions, now, THRESHOLD);
        assert!(index.score <= 5.0);
        assert!(index.score >= 0.0);
    }

    #[test]
    fn non_positive_threshold_is_inactive() {
        let sessions = vec![session(0, HOUR_MS)];
        assert_eq!(activity_index(&sessions, WEEK_MS, 0).score, 0.0);
    }
}
