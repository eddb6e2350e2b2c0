//! PvP kill queries.

use domain::services::math::kdr;
use sqlx::{AnyPool, Row};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::metrics::QueryTimer;
use crate::schema::tables::{kills, sessions};

use super::{player_row_id, server_row_id};

/// Read-only queries over the kills table. Server scope goes through the
/// owning session, since kill rows carry no server id of their own.
#[derive(Clone)]
pub struct KillQueries {
    pool: AnyPool,
}

impl KillQueries {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Player-vs-player kills inside `[from, to)`, optionally limited to
    /// kills recorded on one server.
    pub async fn player_kill_count(
        &self,
        from: i64,
        to: i64,
        server: Option<Uuid>,
    ) -> Result<i64> {
        let operation = "player_kill_count";

        let count: i64 = match server {
            Some(uuid) => {
                let Some(server_id) = server_row_id(&self.pool, uuid).await? else {
                    return Ok(0);
                };
                let timer = QueryTimer::new(operation);
                let count = sqlx::query(&format!(
                    "SELECT COUNT(*) FROM {} k \
                     JOIN {} s ON k.{} = s.{} \
                     WHERE s.{} = ? AND k.{} >= ? AND k.{} < ?",
                    kills::TABLE,
                    sessions::TABLE,
                    kills::SESSION_ID,
                    sessions::ID,
                    sessions::SERVER_ID,
                    kills::DATE,
                    kills::DATE
                ))
                .bind(server_id)
                .bind(from)
                .bind(to)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StorageError::operation(operation, uuid.to_string(), e))?
                .try_get(0)
                .map_err(|e| StorageError::operation(operation, uuid.to_string(), e))?;
                timer.record();
                count
            }
            None => {
                let timer = QueryTimer::new(operation);
                let count = sqlx::query(&format!(
                    "SELECT COUNT(*) FROM {} WHERE {} >= ? AND {} < ?",
                    kills::TABLE,
                    kills::DATE,
                    kills::DATE
                ))
                .bind(from)
                .bind(to)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StorageError::operation(operation, "global", e))?
                .try_get(0)
                .map_err(|e| StorageError::operation(operation, "global", e))?;
                timer.record();
                count
            }
        };
        Ok(count)
    }

    /// Kills one player made inside `[from, to)`.
    pub async fn kills_by_player(&self, player: Uuid, from: i64, to: i64) -> Result<i64> {
        let operation = "kills_by_player";
        let timer = QueryTimer::new(operation);
        let count: i64 = sqlx::query(&format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ? AND {} >= ? AND {} < ?",
            kills::TABLE,
            kills::KILLER_UUID,
            kills::DATE,
            kills::DATE
        ))
        .bind(player.to_string())
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::operation(operation, player.to_string(), e))?
        .try_get(0)
        .map_err(|e| StorageError::operation(operation, player.to_string(), e))?;
        timer.record();
        Ok(count)
    }

    /// One player's kill/death ratio inside `[from, to)`. Deaths come from
    /// session counters, kills from PvP kill rows. Zero deaths yields the
    /// kill count.
    pub async fn player_kdr(&self, player: Uuid, from: i64, to: i64) -> Result<f64> {
        let Some(player_id) = player_row_id(&self.pool, player).await? else {
            return Ok(0.0);
        };

        let kill_count = self.kills_by_player(player, from, to).await?;

        let operation = "player_kdr";
        let timer = QueryTimer::new(operation);
        let death_count: i64 = sqlx::query(&format!(
            "SELECT CAST(COALESCE(SUM({}), 0) AS SIGNED) FROM {} \
             WHERE {} = ? AND {} < ? AND {} > ?",
            sessions::DEATHS,
            sessions::TABLE,
            sessions::USER_ID,
            sessions::START,
            sessions::END
        ))
        .bind(player_id)
        .bind(to)
        .bind(from)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::operation(operation, player.to_string(), e))?
        .try_get(0)
        .map_err(|e| StorageError::operation(operation, player.to_string(), e))?;
        timer.record();

        Ok(kdr(kill_count, death_count))
    }

    /// The weapon with the most recorded kills inside `[from, to)`,
    /// optionally limited to one server.
    pub async fn deadliest_weapon(
        &self,
        from: i64,
        to: i64,
        server: Option<Uuid>,
    ) -> Result<Option<String>> {
        let operation = "deadliest_weapon";

        let (scope_sql, server_id) = match server {
            Some(uuid) => {
                let Some(id) = server_row_id(&self.pool, uuid).await? else {
                    return Ok(None);
                };
                (
                    format!(
                        " JOIN {} s ON k.{} = s.{} AND s.{} = ?",
                        sessions::TABLE,
                        kills::SESSION_ID,
                        sessions::ID,
                        sessions::SERVER_ID
                    ),
                    Some(id),
                )
            }
            None => (String::new(), None),
        };

        let sql = format!(
            "SELECT k.{} FROM {} k{} WHERE k.{} >= ? AND k.{} < ? \
             GROUP BY k.{} ORDER BY COUNT(*) DESC, k.{} ASC LIMIT 1",
            kills::WEAPON,
            kills::TABLE,
            scope_sql,
            kills::DATE,
            kills::DATE,
            kills::WEAPON,
            kills::WEAPON
        );

        let timer = QueryTimer::new(operation);
        let mut query = sqlx::query(&sql);
        if let Some(id) = server_id {
            query = query.bind(id);
        }
        let row = query
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::operation(operation, "weapon ranking", e))?;
        timer.record();

        row.map(|r| {
            r.try_get::<String, _>(0)
                .map_err(|e| StorageError::operation(operation, "weapon ranking", e))
        })
        .transpose()
    }
}
