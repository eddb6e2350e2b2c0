//! Play sessions and kill events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::world_times::WorldTimes;

/// One player-kill event inside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerKill {
    pub killer: Uuid,
    pub victim: Uuid,
    pub weapon: String,
    /// Time of the kill, epoch ms.
    pub date: i64,
}

/// One finished, continuous play period of a player on a server.
///
/// Invariant: `end >= start`. Unterminated sessions live outside this core
/// (held by the event producers) and are flushed into a transaction when the
/// player disconnects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub player: Uuid,
    pub server: Uuid,
    /// Session start, epoch ms.
    pub start: i64,
    /// Session end, epoch ms.
    pub end: i64,
    /// Time spent AFK during the session, ms.
    pub afk_ms: i64,
    pub deaths: i32,
    pub mob_kills: i32,
    pub world_times: WorldTimes,
    pub player_kills: Vec<PlayerKill>,
}

impl Session {
    /// Length of the session in ms.
    pub fn length(&self) -> i64 {
        (self.end - self.start).max(0)
    }

    /// Active (non-AFK) time in ms.
    pub fn active_ms(&self) -> i64 {
        (self.length() - self.afk_ms).max(0)
    }

    /// Number of player kills recorded in this session.
    pub fn player_kill_count(&self) -> i32 {
        self.player_kills.len() as i32
    }

    /// True when any part of the session overlaps `[from, to)`.
    pub fn overlaps(&self, from: i64, to: i64) -> bool {
        self.start < to && self.end > from
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn active_time_subtracts_afk() {
        let mut s = session(1_000, 5_000);
        s.afk_ms = 500;
        assert_eq!(s.length(), 4_000);
        assert_eq!(s.active_ms(), 3_500);
    }

    #[test]
    fn overlap_is_half_open() {
        let s = session(1_000, 5_000);
        assert!(s.overlaps(0, 10_000));
        assert!(s.overlaps(4_999, 10_000));
        assert!(!s.overlaps(5_000, 10_000));
        assert!(!s.overlaps(0, 1_000));
    }
}
