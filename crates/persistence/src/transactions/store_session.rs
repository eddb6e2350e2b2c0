//! Session flush: session row plus owned world times and kills.

use async_trait::async_trait;
use domain::models::{GameMode, Session};
use sqlx::Row;

use crate::db::Dialect;
use crate::error::{Result, StorageError};
use crate::schema::tables::{kills, sessions, world_times};
use crate::sql::{self, Param};

use super::{ensure_world_id, require_player_id, require_server_id, AnyTx, WriteTransaction};

/// Stores one finished session atomically with its world-time breakdown and
/// kill list. Produced by the (out-of-scope) session tracker at player
/// disconnect.
pub struct StoreSessionTransaction {
    pub session: Session,
}

impl StoreSessionTransaction {
    /// Row id of the inserted session: last-insert-id when the driver
    /// reports one, otherwise a lookup by the natural key. Both missing
    /// means the insert silently failed, which is an integrity bug.
    async fn inserted_session_id(
        &self,
        tx: &mut AnyTx<'_>,
        reported: Option<i64>,
        user: i64,
        server: i64,
    ) -> Result<i64> {
        if let Some(id) = reported {
            return Ok(id);
        }

        let row = sqlx::query(&format!(
            "SELECT {} FROM {} WHERE {} = ? AND {} = ? AND {} = ?",
            sessions::ID,
            sessions::TABLE,
            sessions::USER_ID,
            sessions::SERVER_ID,
            sessions::START
        ))
        .bind(user)
        .bind(server)
        .bind(self.session.start)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| StorageError::operation(self.name(), format!("player {}", self.session.player), e))?;

        match row {
            Some(row) => row
                .try_get::<i64, _>(0)
                .map_err(|e| StorageError::operation(self.name(), "session id decode", e)),
            None => Err(StorageError::inconsistency(
                self.name(),
                format!(
                    "no session row found for player {} starting at {} after insert",
                    self.session.player, self.session.start
                ),
            )),
        }
    }
}

#[async_trait]
impl WriteTransaction for StoreSessionTransaction {
    fn name(&self) -> &'static str {
        "store_session"
    }

    async fn apply(&mut self, tx: &mut AnyTx<'_>, _dialect: Dialect) -> Result<()> {
        let op = self.name();
        if self.session.end < self.session.start {
            return Err(StorageError::inconsistency(
                op,
                format!(
                    "session end {} precedes start {}",
                    self.session.end, self.session.start
                ),
            ));
        }

        let user = require_player_id(tx, op, self.session.player).await?;
        let server = require_server_id(tx, op, self.session.server).await?;

        let insert = sqlx::query(&format!(
            "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?, ?, ?)",
            sessions::TABLE,
            sessions::USER_ID,
            sessions::SERVER_ID,
            sessions::START,
            sessions::END,
            sessions::AFK_TIME,
            sessions::DEATHS,
            sessions::MOB_KILLS
        ))
        .bind(user)
        .bind(server)
        .bind(self.session.start)
        .bind(self.session.end)
        .bind(self.session.afk_ms)
        .bind(self.session.deaths as i64)
        .bind(self.session.mob_kills as i64)
        .execute(&mut **tx)
        .await
        .map_err(|e| StorageError::operation(op, format!("player {}", self.session.player), e))?;

        let session_id = self
            .inserted_session_id(tx, insert.last_insert_id(), user, server)
            .await?;

        let mut world_rows: Vec<Vec<Param>> = Vec::new();
        for (world, times) in self.session.world_times.iter() {
            let world_id = ensure_world_id(tx, op, server, world).await?;
            world_rows.push(vec![
                session_id.into(),
                world_id.into(),
                times.get(GameMode::Survival).into(),
                times.get(GameMode::Creative).into(),
                times.get(GameMode::Adventure).into(),
                times.get(GameMode::Spectator).into(),
            ]);
        }
        sql::execute_batch(
            tx,
            op,
            world_times::TABLE,
            &[
                world_times::SESSION_ID,
                world_times::WORLD_ID,
                world_times::SURVIVAL,
                world_times::CREATIVE,
                world_times::ADVENTURE,
                world_times::SPECTATOR,
            ],
            &world_rows,
        )
        .await?;

        let kill_rows: Vec<Vec<Param>> = self
            .session
            .player_kills
            .iter()
            .map(|kill| {
                vec![
                    session_id.into(),
                    kill.killer.to_string().into(),
                    kill.victim.to_string().into(),
                    kill.weapon.clone().into(),
                    kill.date.into(),
                ]
            })
            .collect();
        sql::execute_batch(
            tx,
            op,
            kills::TABLE,
            &[
                kills::SESSION_ID,
                kills::KILLER_UUID,
                kills::VICTIM_UUID,
                kills::WEAPON,
                kills::DATE,
            ],
            &kill_rows,
        )
        .await
    }
}
