//! Connection quality sample queries.

use domain::models::PingSample;
use sqlx::AnyPool;
use uuid::Uuid;

use crate::entities::PingEntity;
use crate::error::{Result, StorageError};
use crate::metrics::QueryTimer;
use crate::schema::tables::{ping, players, servers};

/// Read-only queries over the ping table.
#[derive(Clone)]
pub struct PingQueries {
    pool: AnyPool,
}

impl PingQueries {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    fn columns_and_joins() -> String {
        format!(
            "SELECT p.{} AS player_uuid, sv.{} AS server_uuid, \
                    pg.{} AS date, pg.{} AS min_ping, pg.{} AS max_ping, pg.{} AS avg_ping \
             FROM {} pg \
             JOIN {} p ON pg.{} = p.{} \
             JOIN {} sv ON pg.{} = sv.{}",
            players::UUID,
            servers::UUID,
            ping::DATE,
            ping::MIN_PING,
            ping::MAX_PING,
            ping::AVG_PING,
            ping::TABLE,
            players::TABLE,
            ping::USER_ID,
            players::ID,
            servers::TABLE,
            ping::SERVER_ID,
            servers::ID
        )
    }

    /// Samples of one player on one server inside `[from, to)`, oldest
    /// first.
    pub async fn fetch_pings(
        &self,
        player: Uuid,
        server: Uuid,
        from: i64,
        to: i64,
    ) -> Result<Vec<PingSample>> {
        let timer = QueryTimer::new("fetch_pings");
        let entities = sqlx::query_as::<_, PingEntity>(&format!(
            "{} WHERE p.{} = ? AND sv.{} = ? AND pg.{} >= ? AND pg.{} < ? ORDER BY pg.{}",
            Self::columns_and_joins(),
            players::UUID,
            servers::UUID,
            ping::DATE,
            ping::DATE,
            ping::DATE
        ))
        .bind(player.to_string())
        .bind(server.to_string())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::operation("fetch_pings", player.to_string(), e))?;
        timer.record();

        entities.into_iter().map(PingEntity::into_domain).collect()
    }

    /// Samples of one player across all servers inside `[from, to)`.
    pub async fn fetch_player_pings(
        &self,
        player: Uuid,
        from: i64,
        to: i64,
    ) -> Result<Vec<PingSample>> {
        let timer = QueryTimer::new("fetch_player_pings");
        let entities = sqlx::query_as::<_, PingEntity>(&format!(
            "{} WHERE p.{} = ? AND pg.{} >= ? AND pg.{} < ? ORDER BY pg.{}",
            Self::columns_and_joins(),
            players::UUID,
            ping::DATE,
            ping::DATE,
            ping::DATE
        ))
        .bind(player.to_string())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::operation("fetch_player_pings", player.to_string(), e))?;
        timer.record();

        entities.into_iter().map(PingEntity::into_domain).collect()
    }

    /// One page of all ping rows, for the backup copy.
    pub async fn fetch_pings_page(&self, limit: i64, offset: i64) -> Result<Vec<PingSample>> {
        let timer = QueryTimer::new("fetch_pings_page");
        let entities = sqlx::query_as::<_, PingEntity>(&format!(
            "{} ORDER BY pg.{}, pg.{} LIMIT ? OFFSET ?",
            Self::columns_and_joins(),
            ping::USER_ID,
            ping::DATE
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::operation("fetch_pings_page", format!("offset {offset}"), e))?;
        timer.record();

        entities.into_iter().map(PingEntity::into_domain).collect()
    }
}
