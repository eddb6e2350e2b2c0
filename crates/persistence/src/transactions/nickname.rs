//! Nickname observations.

use async_trait::async_trait;
use domain::models::Nickname;

use crate::db::Dialect;
use crate::error::{Result, StorageError};
use crate::schema::tables::nicknames;

use super::{require_player_id, require_server_id, AnyTx, WriteTransaction};

/// Records a nickname sighting: refreshes `last_used` for a known
/// (player, server, nickname) triple, inserts the row otherwise.
pub struct StoreNicknameTransaction {
    pub nickname: Nickname,
}

#[async_trait]
impl WriteTransaction for StoreNicknameTransaction {
    fn name(&self) -> &'static str {
        "store_nickname"
    }

    async fn apply(&mut self, tx: &mut AnyTx<'_>, _dialect: Dialect) -> Result<()> {
        let op = self.name();
        let context = || format!("player {}", self.nickname.player);

        let user = require_player_id(tx, op, self.nickname.player).await?;
        let server = require_server_id(tx, op, self.nickname.server).await?;

        let updated = sqlx::query(&format!(
            "UPDATE {} SET {} = ? WHERE {} = ? AND {} = ? AND {} = ?",
            nicknames::TABLE,
            nicknames::LAST_USED,
            nicknames::USER_ID,
            nicknames::SERVER_ID,
            nicknames::NICKNAME
        ))
        .bind(self.nickname.last_used)
        .bind(user)
        .bind(server)
        .bind(self.nickname.name.clone())
        .execute(&mut **tx)
        .await
        .map_err(|e| StorageError::operation(op, context(), e))?
        .rows_affected();

        if updated == 0 {
            sqlx::query(&format!(
                "INSERT INTO {} ({}, {}, {}, {}) VALUES (?, ?, ?, ?)",
                nicknames::TABLE,
                nicknames::USER_ID,
                nicknames::SERVER_ID,
                nicknames::NICKNAME,
                nicknames::LAST_USED
            ))
            .bind(user)
            .bind(server)
            .bind(self.nickname.name.clone())
            .bind(self.nickname.last_used)
            .execute(&mut **tx)
            .await
            .map_err(|e| StorageError::operation(op, context(), e))?;
        }
        Ok(())
    }
}
