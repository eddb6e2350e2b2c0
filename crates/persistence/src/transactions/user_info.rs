//! Per-server user info writes.

use async_trait::async_trait;
use domain::models::UserInfo;
use sqlx::Row;
use uuid::Uuid;

use crate::db::Dialect;
use crate::error::{Result, StorageError};
use crate::schema::tables::user_info;

use super::{require_player_id, require_server_id, AnyTx, WriteTransaction};

/// Registers a player on one specific server.
///
/// The (player, server) pair gets at most one row; re-registration is a
/// no-op so session flushes can run it defensively first.
pub struct RegisterUserInfoTransaction {
    pub user_info: UserInfo,
}

#[async_trait]
impl WriteTransaction for RegisterUserInfoTransaction {
    fn name(&self) -> &'static str {
        "register_user_info"
    }

    async fn apply(&mut self, tx: &mut AnyTx<'_>, _dialect: Dialect) -> Result<()> {
        let op = self.name();
        let user = require_player_id(tx, op, self.user_info.player).await?;
        let server = require_server_id(tx, op, self.user_info.server).await?;

        let existing: i64 = sqlx::query(&format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ? AND {} = ?",
            user_info::TABLE,
            user_info::USER_ID,
            user_info::SERVER_ID
        ))
        .bind(user)
        .bind(server)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| StorageError::operation(op, format!("player {}", self.user_info.player), e))?
        .try_get(0)
        .map_err(|e| StorageError::operation(op, format!("player {}", self.user_info.player), e))?;

        if existing == 0 {
            sqlx::query(&format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?)",
                user_info::TABLE,
                user_info::USER_ID,
                user_info::SERVER_ID,
                user_info::REGISTERED,
                user_info::OP,
                user_info::BANNED
            ))
            .bind(user)
            .bind(server)
            .bind(self.user_info.registered)
            .bind(self.user_info.operator as i64)
            .bind(self.user_info.banned as i64)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                StorageError::operation(op, format!("player {}", self.user_info.player), e)
            })?;
        }
        Ok(())
    }
}

async fn set_flag(
    tx: &mut AnyTx<'_>,
    op: &'static str,
    flag_column: &'static str,
    player: Uuid,
    server: Uuid,
    value: bool,
) -> Result<()> {
    let user = require_player_id(tx, op, player).await?;
    let server_row = require_server_id(tx, op, server).await?;

    sqlx::query(&format!(
        "UPDATE {} SET {} = ? WHERE {} = ? AND {} = ?",
        user_info::TABLE,
        flag_column,
        user_info::USER_ID,
        user_info::SERVER_ID
    ))
    .bind(value as i64)
    .bind(user)
    .bind(server_row)
    .execute(&mut **tx)
    .await
    .map_err(|e| StorageError::operation(op, format!("player {player}"), e))?;
    Ok(())
}

/// Updates the operator flag of a player on one server.
pub struct SetOperatorStatusTransaction {
    pub player: Uuid,
    pub server: Uuid,
    pub operator: bool,
}

#[async_trait]
impl WriteTransaction for SetOperatorStatusTransaction {
    fn name(&self) -> &'static str {
        "set_operator_status"
    }

    async fn apply(&mut self, tx: &mut AnyTx<'_>, _dialect: Dialect) -> Result<()> {
        set_flag(
            tx,
            self.name(),
            user_info::OP,
            self.player,
            self.server,
            self.operator,
        )
        .await
    }
}

/// Updates the ban flag of a player on one server.
pub struct SetBanStatusTransaction {
    pub player: Uuid,
    pub server: Uuid,
    pub banned: bool,
}

#[async_trait]
impl WriteTransaction for SetBanStatusTransaction {
    fn name(&self) -> &'static str {
        "set_ban_status"
    }

    async fn apply(&mut self, tx: &mut AnyTx<'_>, _dialect: Dialect) -> Result<()> {
        set_flag(
            tx,
            self.name(),
            user_info::BANNED,
            self.player,
            self.server,
            self.banned,
        )
        .await
    }
}
