//! Per-world, per-gamemode playtime breakdown of a session.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The four fixed gamemode buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Survival,
        GameMode::Creative,
        GameMode::Adventure,
        GameMode::Spectator,
    ];
}

/// Milliseconds spent in each gamemode within one world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameModeTimes {
    pub survival: i64,
    pub creative: i64,
    pub adventure: i64,
    pub spectator: i64,
}

impl GameModeTimes {
    pub fn get(&self, mode: GameMode) -> i64 {
        match mode {
            GameMode::Survival => self.survival,
            GameMode::Creative => self.creative,
            GameMode::Adventure => self.adventure,
            GameMode::Spectator => self.spectator,
        }
    }

    pub fn add(&mut self, mode: GameMode, ms: i64) {
        match mode {
            GameMode::Survival => self.survival += ms,
            GameMode::Creative => self.creative += ms,
            GameMode::Adventure => self.adventure += ms,
            GameMode::Spectator => self.spectator += ms,
        }
    }

    pub fn total(&self) -> i64 {
        self.survival + self.creative + self.adventure + self.spectator
    }
}

/// Mapping from world name to gamemode durations.
///
/// Invariant: the sum of all durations equals the owning session's active
/// (non-AFK) time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldTimes {
    times: HashMap<String, GameModeTimes>,
}

impl WorldTimes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, world: impl Into<String>, mode: GameMode, ms: i64) {
        self.times.entry(world.into()).or_default().add(mode, ms);
    }

    pub fn set(&mut self, world: impl Into<String>, times: GameModeTimes) {
        self.times.insert(world.into(), times);
    }

    pub fn world(&self, world: &str) -> Option<&GameModeTimes> {
        self.times.get(world)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GameModeTimes)> {
        self.times.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Total time across all worlds and gamemodes.
    pub fn total(&self) -> i64 {
        self.times.values().map(GameModeTimes::total).sum()
    }

    /// Total time in one gamemode across all worlds.
    pub fn total_in(&self, mode: GameMode) -> i64 {
        self.times.values().map(|t| t.get(mode)).sum()
    }

    /// Merges another breakdown into this one, summing per world and mode.
    pub fn merge(&mut self, other: &WorldTimes) {
        for (world, times) in other.iter() {
            let entry = self.times.entry(world.to_string()).or_default();
            for mode in GameMode::ALL {
                entry.add(mode, times.get(mode));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_sum_across_worlds_and_modes() {
        let mut times = WorldTimes::new();
        times.add("world", GameMode::Survival, 1_000);
        times.add("world", GameMode::Creative, 500);
        times.add("world_nether", GameMode::Survival, 250);

        assert_eq!(times.total(), 1_750);
        assert_eq!(times.total_in(GameMode::Survival), 1_250);
        assert_eq!(times.total_in(GameMode::Spectator), 0);
    }

    #[test]
    fn merge_sums_matching_buckets() {
        let mut a = WorldTimes::new();
        a.add("world", GameMode::Survival, 100);
        let mut b = WorldTimes::new();
        b.add("world", GameMode::Survival, 50);
        b.add("world_end", GameMode::Adventure, 25);

        a.merge(&b);
        assert_eq!(a.world("world").unwrap().survival, 150);
        assert_eq!(a.world("world_end").unwrap().adventure, 25);
        assert_eq!(a.total(), 175);
    }
}
