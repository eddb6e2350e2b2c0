//! Session, world-time and kill entities (database row mappings).

use domain::models::{GameModeTimes, PlayerKill, Session, WorldTimes};
use sqlx::FromRow;

use crate::error::StorageError;

use super::parse_uuid;

/// Session row joined with the player and server UUIDs.
#[derive(Debug, Clone, FromRow)]
pub struct SessionEntity {
    pub id: i64,
    pub player_uuid: String,
    pub server_uuid: String,
    pub session_start: i64,
    pub session_end: i64,
    pub afk_time: i64,
    pub deaths: i64,
    pub mob_kills: i64,
}

impl SessionEntity {
    /// Builds the domain session from this row plus its owned world-time and
    /// kill rows.
    pub fn into_domain(
        self,
        world_times: Vec<WorldTimeEntity>,
        kills: Vec<KillEntity>,
    ) -> Result<Session, StorageError> {
        let mut times = WorldTimes::new();
        for wt in world_times {
            times.set(
                wt.world_name,
                GameModeTimes {
                    survival: wt.survival_time,
                    creative: wt.creative_time,
                    adventure: wt.adventure_time,
                    spectator: wt.spectator_time,
                },
            );
        }

        let player_kills = kills
            .into_iter()
            .map(KillEntity::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Session {
            player: parse_uuid("session row", &self.player_uuid)?,
            server: parse_uuid("session row", &self.server_uuid)?,
            start: self.session_start,
            end: self.session_end,
            afk_ms: self.afk_time,
            deaths: self.deaths as i32,
            mob_kills: self.mob_kills as i32,
            world_times: times,
            player_kills,
        })
    }
}

/// World-time row joined with the world name.
#[derive(Debug, Clone, FromRow)]
pub struct WorldTimeEntity {
    pub session_id: i64,
    pub world_name: String,
    pub survival_time: i64,
    pub creative_time: i64,
    pub adventure_time: i64,
    pub spectator_time: i64,
}

/// Database row mapping for the kills table.
#[derive(Debug, Clone, FromRow)]
pub struct KillEntity {
    pub session_id: i64,
    pub killer_uuid: String,
    pub victim_uuid: String,
    pub weapon: String,
    pub date: i64,
}

impl KillEntity {
    pub fn into_domain(self) -> Result<PlayerKill, StorageError> {
        Ok(PlayerKill {
            killer: parse_uuid("kill row", &self.killer_uuid)?,
            victim: parse_uuid("kill row", &self.victim_uuid)?,
            weapon: self.weapon,
            date: self.date,
        })
    }
}
