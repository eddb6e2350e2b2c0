//! Player registration.

use async_trait::async_trait;
use domain::models::Player;

use crate::db::Dialect;
use crate::error::{Result, StorageError};
use crate::schema::tables::players;

use super::{player_id, AnyTx, WriteTransaction};

/// Registers a player globally, or refreshes their most recent name.
///
/// The stored registration timestamp is the first one ever seen and is not
/// moved by re-registration.
pub struct RegisterPlayerTransaction {
    pub player: Player,
}

#[async_trait]
impl WriteTransaction for RegisterPlayerTransaction {
    fn name(&self) -> &'static str {
        "register_player"
    }

    async fn apply(&mut self, tx: &mut AnyTx<'_>, _dialect: Dialect) -> Result<()> {
        let uuid = self.player.uuid;

        if player_id(tx, uuid).await?.is_some() {
            sqlx::query(&format!(
                "UPDATE {} SET {} = ? WHERE {} = ?",
                players::TABLE,
                players::NAME,
                players::UUID
            ))
            .bind(self.player.name.clone())
            .bind(uuid.to_string())
            .execute(&mut **tx)
            .await
            .map_err(|e| StorageError::operation(self.name(), uuid.to_string(), e))?;
        } else {
            sqlx::query(&format!(
                "INSERT INTO {} ({}, {}, {}) VALUES (?, ?, ?)",
                players::TABLE,
                players::UUID,
                players::NAME,
                players::REGISTERED
            ))
            .bind(uuid.to_string())
            .bind(self.player.name.clone())
            .bind(self.player.registered)
            .execute(&mut **tx)
            .await
            .map_err(|e| StorageError::operation(self.name(), uuid.to_string(), e))?;
        }
        Ok(())
    }
}
