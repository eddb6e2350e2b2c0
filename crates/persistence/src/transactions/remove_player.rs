//! Explicit player removal.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::Dialect;
use crate::error::{Result, StorageError};
use crate::schema::tables::{kills, nicknames, ping, players, sessions, user_info, world_times};

use super::{player_id, AnyTx, WriteTransaction};

/// Removes a player and everything they own, in foreign-key order:
/// kills and world times of their sessions, the sessions themselves, ping,
/// nicknames, per-server user info, then the player row. Removing an
/// unknown player is a no-op.
pub struct RemovePlayerTransaction {
    pub player: Uuid,
}

impl RemovePlayerTransaction {
    async fn delete_by_user(
        &self,
        tx: &mut AnyTx<'_>,
        sql: String,
        user: i64,
    ) -> Result<()> {
        sqlx::query(&sql)
            .bind(user)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                StorageError::operation(self.name(), format!("player {}", self.player), e)
            })?;
        Ok(())
    }
}

#[async_trait]
impl WriteTransaction for RemovePlayerTransaction {
    fn name(&self) -> &'static str {
        "remove_player"
    }

    async fn apply(&mut self, tx: &mut AnyTx<'_>, _dialect: Dialect) -> Result<()> {
        let op = self.name();
        let uuid = self.player.to_string();

        let Some(user) = player_id(tx, self.player).await? else {
            return Ok(());
        };

        // Kill rows record UUIDs directly; remove kills where the player
        // was killer or victim regardless of whose session owns them.
        sqlx::query(&format!(
            "DELETE FROM {} WHERE {} = ? OR {} = ?",
            kills::TABLE,
            kills::KILLER_UUID,
            kills::VICTIM_UUID
        ))
        .bind(uuid.clone())
        .bind(uuid)
        .execute(&mut **tx)
        .await
        .map_err(|e| StorageError::operation(op, format!("player {}", self.player), e))?;

        let session_owned = |table: &str, column: &str| {
            format!(
                "DELETE FROM {} WHERE {} IN (SELECT {} FROM {} WHERE {} = ?)",
                table,
                column,
                sessions::ID,
                sessions::TABLE,
                sessions::USER_ID
            )
        };
        self.delete_by_user(
            tx,
            session_owned(world_times::TABLE, world_times::SESSION_ID),
            user,
        )
        .await?;
        self.delete_by_user(tx, session_owned(kills::TABLE, kills::SESSION_ID), user)
            .await?;

        let by_user = |table: &str, column: &str| {
            format!("DELETE FROM {table} WHERE {column} = ?")
        };
        self.delete_by_user(tx, by_user(sessions::TABLE, sessions::USER_ID), user)
            .await?;
        self.delete_by_user(tx, by_user(ping::TABLE, ping::USER_ID), user)
            .await?;
        self.delete_by_user(tx, by_user(nicknames::TABLE, nicknames::USER_ID), user)
            .await?;
        self.delete_by_user(tx, by_user(user_info::TABLE, user_info::USER_ID), user)
            .await?;
        self.delete_by_user(tx, by_user(players::TABLE, players::ID), user)
            .await?;
        Ok(())
    }
}
