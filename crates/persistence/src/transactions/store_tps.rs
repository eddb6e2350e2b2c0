//! Batched TPS and ping sample writes.

use async_trait::async_trait;
use domain::models::{PingSample, TpsSample};
use uuid::Uuid;

use crate::db::Dialect;
use crate::error::Result;
use crate::schema::tables::{ping, tps};
use crate::sql::{self, Param};

use super::{require_player_id, require_server_id, AnyTx, WriteTransaction};

/// Stores a batch of TPS samples for one server as a single unit.
///
/// Producers collect samples over a flush window and submit them together;
/// one network round-trip per batch where the dialect supports it.
pub struct StoreTpsTransaction {
    pub server: Uuid,
    pub samples: Vec<TpsSample>,
}

#[async_trait]
impl WriteTransaction for StoreTpsTransaction {
    fn name(&self) -> &'static str {
        "store_tps"
    }

    async fn apply(&mut self, tx: &mut AnyTx<'_>, _dialect: Dialect) -> Result<()> {
        let server = require_server_id(tx, self.name(), self.server).await?;

        let rows: Vec<Vec<Param>> = self
            .samples
            .iter()
            .map(|s| {
                vec![
                    server.into(),
                    s.date.into(),
                    s.tps.into(),
                    (s.players_online as i64).into(),
                    s.cpu_usage.into(),
                    s.ram_usage.into(),
                    (s.entities as i64).into(),
                    (s.chunks_loaded as i64).into(),
                    s.free_disk.into(),
                ]
            })
            .collect();

        sql::execute_batch(
            tx,
            self.name(),
            tps::TABLE,
            &[
                tps::SERVER_ID,
                tps::DATE,
                tps::TPS,
                tps::PLAYERS_ONLINE,
                tps::CPU_USAGE,
                tps::RAM_USAGE,
                tps::ENTITIES,
                tps::CHUNKS,
                tps::FREE_DISK,
            ],
            &rows,
        )
        .await
    }
}

/// Stores a batch of ping samples, resolving each (player, server) pair once.
pub struct StorePingTransaction {
    pub samples: Vec<PingSample>,
}

#[async_trait]
impl WriteTransaction for StorePingTransaction {
    fn name(&self) -> &'static str {
        "store_ping"
    }

    async fn apply(&mut self, tx: &mut AnyTx<'_>, _dialect: Dialect) -> Result<()> {
        let op = self.name();
        let mut rows: Vec<Vec<Param>> = Vec::with_capacity(self.samples.len());

        for sample in &self.samples {
            let user = require_player_id(tx, op, sample.player).await?;
            let server = require_server_id(tx, op, sample.server).await?;
            rows.push(vec![
                user.into(),
                server.into(),
                sample.date.into(),
                (sample.min_ms as i64).into(),
                (sample.max_ms as i64).into(),
                sample.avg_ms.into(),
            ]);
        }

        sql::execute_batch(
            tx,
            op,
            ping::TABLE,
            &[
                ping::USER_ID,
                ping::SERVER_ID,
                ping::DATE,
                ping::MIN_PING,
                ping::MAX_PING,
                ping::AVG_PING,
            ],
            &rows,
        )
        .await
    }
}
