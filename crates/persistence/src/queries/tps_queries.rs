//! Server performance sample queries.

use domain::models::TpsSample;
use sqlx::{AnyPool, Row};
use uuid::Uuid;

use crate::entities::TpsEntity;
use crate::error::{Result, StorageError};
use crate::metrics::QueryTimer;
use crate::schema::tables::tps;

use super::server_row_id;

/// Read-only queries over the tps table.
#[derive(Clone)]
pub struct TpsQueries {
    pool: AnyPool,
}

impl TpsQueries {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    fn select_columns() -> String {
        format!(
            "{}, {}, {}, {}, {}, {}, {}, {}",
            tps::DATE,
            tps::TPS,
            tps::PLAYERS_ONLINE,
            tps::CPU_USAGE,
            tps::RAM_USAGE,
            tps::ENTITIES,
            tps::CHUNKS,
            tps::FREE_DISK
        )
    }

    /// Samples of one server inside `[from, to)`, oldest first. Gap and
    /// downtime calculations depend on that ordering.
    pub async fn fetch_tps(&self, server: Uuid, from: i64, to: i64) -> Result<Vec<TpsSample>> {
        let Some(server_id) = server_row_id(&self.pool, server).await? else {
            return Ok(Vec::new());
        };

        let timer = QueryTimer::new("fetch_tps");
        let entities = sqlx::query_as::<_, TpsEntity>(&format!(
            "SELECT {} FROM {} WHERE {} = ? AND {} >= ? AND {} < ? ORDER BY {}",
            Self::select_columns(),
            tps::TABLE,
            tps::SERVER_ID,
            tps::DATE,
            tps::DATE,
            tps::DATE
        ))
        .bind(server_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::operation("fetch_tps", server.to_string(), e))?;
        timer.record();

        Ok(entities.into_iter().map(TpsSample::from).collect())
    }

    /// One page of a server's samples with their server UUID restored, for
    /// the backup copy.
    pub async fn fetch_tps_page(
        &self,
        server: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TpsSample>> {
        let Some(server_id) = server_row_id(&self.pool, server).await? else {
            return Ok(Vec::new());
        };

        let timer = QueryTimer::new("fetch_tps_page");
        let entities = sqlx::query_as::<_, TpsEntity>(&format!(
            "SELECT {} FROM {} WHERE {} = ? ORDER BY {} LIMIT ? OFFSET ?",
            Self::select_columns(),
            tps::TABLE,
            tps::SERVER_ID,
            tps::DATE
        ))
        .bind(server_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::operation("fetch_tps_page", server.to_string(), e))?;
        timer.record();

        Ok(entities.into_iter().map(TpsSample::from).collect())
    }

    /// The busiest sample of a server at or after `after_date`. Ties on
    /// player count resolve to the earliest sample.
    pub async fn peak_player_count(
        &self,
        server: Uuid,
        after_date: i64,
    ) -> Result<Option<(i64, i32)>> {
        let Some(server_id) = server_row_id(&self.pool, server).await? else {
            return Ok(None);
        };

        let operation = "peak_player_count";
        let timer = QueryTimer::new(operation);
        let row = sqlx::query(&format!(
            "SELECT {}, {} FROM {} WHERE {} = ? AND {} >= ? \
             ORDER BY {} DESC, {} ASC LIMIT 1",
            tps::DATE,
            tps::PLAYERS_ONLINE,
            tps::TABLE,
            tps::SERVER_ID,
            tps::DATE,
            tps::PLAYERS_ONLINE,
            tps::DATE
        ))
        .bind(server_id)
        .bind(after_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::operation(operation, server.to_string(), e))?;
        timer.record();

        row.map(|r| {
            let date: i64 = r
                .try_get(0)
                .map_err(|e| StorageError::operation(operation, server.to_string(), e))?;
            let players: i64 = r
                .try_get(1)
                .map_err(|e| StorageError::operation(operation, server.to_string(), e))?;
            Ok((date, players as i32))
        })
        .transpose()
    }

    /// The busiest sample of a server over all recorded history.
    pub async fn all_time_peak_player_count(&self, server: Uuid) -> Result<Option<(i64, i32)>> {
        self.peak_player_count(server, 0).await
    }
}
