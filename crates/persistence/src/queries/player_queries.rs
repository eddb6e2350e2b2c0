//! Player registry, user-info and nickname queries.

use domain::models::{Nickname, Player, UserInfo};
use sqlx::{AnyPool, Row};
use uuid::Uuid;

use crate::entities::{NicknameEntity, PlayerEntity, UserInfoEntity};
use crate::error::{Result, StorageError};
use crate::metrics::QueryTimer;
use crate::schema::tables::{nicknames, players, servers, user_info};

use super::server_row_id;

/// Read-only queries over players, user_info and nicknames.
#[derive(Clone)]
pub struct PlayerQueries {
    pool: AnyPool,
}

impl PlayerQueries {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// One player by UUID.
    pub async fn fetch_player(&self, uuid: Uuid) -> Result<Option<Player>> {
        let timer = QueryTimer::new("fetch_player");
        let entity = sqlx::query_as::<_, PlayerEntity>(&format!(
            "SELECT {}, {}, {}, {} FROM {} WHERE {} = ?",
            players::ID,
            players::UUID,
            players::NAME,
            players::REGISTERED,
            players::TABLE,
            players::UUID
        ))
        .bind(uuid.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::operation("fetch_player", uuid.to_string(), e))?;
        timer.record();

        entity.map(PlayerEntity::into_domain).transpose()
    }

    /// One page of all players, ordered by row id.
    pub async fn fetch_players_page(&self, limit: i64, offset: i64) -> Result<Vec<Player>> {
        let timer = QueryTimer::new("fetch_players_page");
        let entities = sqlx::query_as::<_, PlayerEntity>(&format!(
            "SELECT {}, {}, {}, {} FROM {} ORDER BY {} LIMIT ? OFFSET ?",
            players::ID,
            players::UUID,
            players::NAME,
            players::REGISTERED,
            players::TABLE,
            players::ID
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::operation("fetch_players_page", format!("offset {offset}"), e))?;
        timer.record();

        entities
            .into_iter()
            .map(PlayerEntity::into_domain)
            .collect()
    }

    /// Players registered during `[from, to)`. Server scope counts
    /// registrations on that server, global scope counts first-ever
    /// registrations.
    pub async fn new_player_count(
        &self,
        from: i64,
        to: i64,
        server: Option<Uuid>,
    ) -> Result<i64> {
        let operation = "new_player_count";
        let timer = QueryTimer::new(operation);

        let count: i64 = match server {
            Some(uuid) => {
                let Some(server_id) = server_row_id(&self.pool, uuid).await? else {
                    return Ok(0);
                };
                sqlx::query(&format!(
                    "SELECT COUNT(*) FROM {} WHERE {} = ? AND {} >= ? AND {} < ?",
                    user_info::TABLE,
                    user_info::SERVER_ID,
                    user_info::REGISTERED,
                    user_info::REGISTERED
                ))
                .bind(server_id)
                .bind(from)
                .bind(to)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StorageError::operation(operation, uuid.to_string(), e))?
                .try_get(0)
                .map_err(|e| StorageError::operation(operation, uuid.to_string(), e))?
            }
            None => sqlx::query(&format!(
                "SELECT COUNT(*) FROM {} WHERE {} >= ? AND {} < ?",
                players::TABLE,
                players::REGISTERED,
                players::REGISTERED
            ))
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::operation(operation, "global", e))?
            .try_get(0)
            .map_err(|e| StorageError::operation(operation, "global", e))?,
        };
        timer.record();
        Ok(count)
    }

    fn user_info_columns() -> String {
        format!(
            "p.{} AS player_uuid, sv.{} AS server_uuid, \
             ui.{} AS registered, ui.{} AS opped, ui.{} AS banned",
            players::UUID,
            servers::UUID,
            user_info::REGISTERED,
            user_info::OP,
            user_info::BANNED
        )
    }

    fn user_info_joins() -> String {
        format!(
            "FROM {} ui \
             JOIN {} p ON ui.{} = p.{} \
             JOIN {} sv ON ui.{} = sv.{}",
            user_info::TABLE,
            players::TABLE,
            user_info::USER_ID,
            players::ID,
            servers::TABLE,
            user_info::SERVER_ID,
            servers::ID
        )
    }

    /// All user-info rows of one server.
    pub async fn fetch_user_info(&self, server: Uuid) -> Result<Vec<UserInfo>> {
        let timer = QueryTimer::new("fetch_user_info");
        let entities = sqlx::query_as::<_, UserInfoEntity>(&format!(
            "SELECT {} {} WHERE sv.{} = ?",
            Self::user_info_columns(),
            Self::user_info_joins(),
            servers::UUID
        ))
        .bind(server.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::operation("fetch_user_info", server.to_string(), e))?;
        timer.record();

        entities
            .into_iter()
            .map(UserInfoEntity::into_domain)
            .collect()
    }

    /// One page of all user-info rows, for the backup copy.
    pub async fn fetch_user_info_page(&self, limit: i64, offset: i64) -> Result<Vec<UserInfo>> {
        let timer = QueryTimer::new("fetch_user_info_page");
        let entities = sqlx::query_as::<_, UserInfoEntity>(&format!(
            "SELECT {} {} ORDER BY ui.{}, ui.{} LIMIT ? OFFSET ?",
            Self::user_info_columns(),
            Self::user_info_joins(),
            user_info::USER_ID,
            user_info::SERVER_ID
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            StorageError::operation("fetch_user_info_page", format!("offset {offset}"), e)
        })?;
        timer.record();

        entities
            .into_iter()
            .map(UserInfoEntity::into_domain)
            .collect()
    }

    /// Operator count on one server.
    pub async fn operator_count(&self, server: Uuid) -> Result<i64> {
        self.flag_count("operator_count", user_info::OP, server).await
    }

    /// Banned-player count on one server.
    pub async fn banned_count(&self, server: Uuid) -> Result<i64> {
        self.flag_count("banned_count", user_info::BANNED, server).await
    }

    async fn flag_count(
        &self,
        operation: &'static str,
        flag_column: &'static str,
        server: Uuid,
    ) -> Result<i64> {
        let Some(server_id) = server_row_id(&self.pool, server).await? else {
            return Ok(0);
        };
        let timer = QueryTimer::new(operation);
        let count: i64 = sqlx::query(&format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ? AND {} = ?",
            user_info::TABLE,
            user_info::SERVER_ID,
            flag_column
        ))
        .bind(server_id)
        .bind(1_i64)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::operation(operation, server.to_string(), e))?
        .try_get(0)
        .map_err(|e| StorageError::operation(operation, server.to_string(), e))?;
        timer.record();
        Ok(count)
    }

    fn nickname_columns_and_joins() -> String {
        format!(
            "SELECT p.{} AS player_uuid, sv.{} AS server_uuid, \
                    n.{} AS nickname, n.{} AS last_used \
             FROM {} n \
             JOIN {} p ON n.{} = p.{} \
             JOIN {} sv ON n.{} = sv.{}",
            players::UUID,
            servers::UUID,
            nicknames::NICKNAME,
            nicknames::LAST_USED,
            nicknames::TABLE,
            players::TABLE,
            nicknames::USER_ID,
            players::ID,
            servers::TABLE,
            nicknames::SERVER_ID,
            servers::ID
        )
    }

    /// All nicknames a player has used, most recent first.
    pub async fn fetch_nicknames(&self, player: Uuid) -> Result<Vec<Nickname>> {
        let timer = QueryTimer::new("fetch_nicknames");
        let entities = sqlx::query_as::<_, NicknameEntity>(&format!(
            "{} WHERE p.{} = ? ORDER BY n.{} DESC",
            Self::nickname_columns_and_joins(),
            players::UUID,
            nicknames::LAST_USED
        ))
        .bind(player.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::operation("fetch_nicknames", player.to_string(), e))?;
        timer.record();

        entities
            .into_iter()
            .map(NicknameEntity::into_domain)
            .collect()
    }

    /// One page of all nickname rows, for the backup copy.
    pub async fn fetch_nicknames_page(&self, limit: i64, offset: i64) -> Result<Vec<Nickname>> {
        let timer = QueryTimer::new("fetch_nicknames_page");
        let entities = sqlx::query_as::<_, NicknameEntity>(&format!(
            "{} ORDER BY n.{}, n.{} LIMIT ? OFFSET ?",
            Self::nickname_columns_and_joins(),
            nicknames::USER_ID,
            nicknames::LAST_USED
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            StorageError::operation("fetch_nicknames_page", format!("offset {offset}"), e)
        })?;
        timer.record();

        entities
            .into_iter()
            .map(NicknameEntity::into_domain)
            .collect()
    }
}
