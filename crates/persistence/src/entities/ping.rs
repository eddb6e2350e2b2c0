//! Ping entity (database row mapping).

use domain::models::PingSample;
use sqlx::FromRow;

use crate::error::StorageError;

use super::parse_uuid;

/// Ping row joined with the player and server UUIDs.
#[derive(Debug, Clone, FromRow)]
pub struct PingEntity {
    pub player_uuid: String,
    pub server_uuid: String,
    pub date: i64,
    pub min_ping: i64,
    pub max_ping: i64,
    pub avg_ping: f64,
}

impl PingEntity {
    pub fn into_domain(self) -> Result<PingSample, StorageError> {
        Ok(PingSample {
            player: parse_uuid("ping row", &self.player_uuid)?,
            server: parse_uuid("ping row", &self.server_uuid)?,
            date: self.date,
            min_ms: self.min_ping as i32,
            max_ms: self.max_ping as i32,
            avg_ms: self.avg_ping,
        })
    }
}
