//! Per-server user info entity (database row mapping).

use domain::models::UserInfo;
use sqlx::FromRow;

use crate::error::StorageError;

use super::parse_uuid;

/// User-info row joined with the player and server UUIDs.
#[derive(Debug, Clone, FromRow)]
pub struct UserInfoEntity {
    pub player_uuid: String,
    pub server_uuid: String,
    pub registered: i64,
    pub opped: i64,
    pub banned: i64,
}

impl UserInfoEntity {
    pub fn into_domain(self) -> Result<UserInfo, StorageError> {
        Ok(UserInfo {
            player: parse_uuid("user_info row", &self.player_uuid)?,
            server: parse_uuid("user_info row", &self.server_uuid)?,
            registered: self.registered,
            operator: self.opped != 0,
            banned: self.banned != 0,
        })
    }
}
