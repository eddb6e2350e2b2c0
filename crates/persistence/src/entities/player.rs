//! Player and nickname entities (database row mappings).

use domain::models::{Nickname, Player};
use sqlx::FromRow;

use crate::error::StorageError;

use super::parse_uuid;

/// Database row mapping for the players table.
#[derive(Debug, Clone, FromRow)]
pub struct PlayerEntity {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub registered: i64,
}

impl PlayerEntity {
    pub fn into_domain(self) -> Result<Player, StorageError> {
        Ok(Player {
            uuid: parse_uuid("player row", &self.uuid)?,
            name: self.name,
            registered: self.registered,
        })
    }
}

/// Nickname row joined with the player and server UUIDs.
#[derive(Debug, Clone, FromRow)]
pub struct NicknameEntity {
    pub player_uuid: String,
    pub server_uuid: String,
    pub nickname: String,
    pub last_used: i64,
}

impl NicknameEntity {
    pub fn into_domain(self) -> Result<Nickname, StorageError> {
        Ok(Nickname {
            player: parse_uuid("nickname row", &self.player_uuid)?,
            server: parse_uuid("nickname row", &self.server_uuid)?,
            name: self.nickname,
            last_used: self.last_used,
        })
    }
}
