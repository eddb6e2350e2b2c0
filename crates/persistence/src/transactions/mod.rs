//! Atomic write transactions and their executor.
//!
//! A transaction is a named, ordered group of statements applied on one
//! connection; either every statement commits or none does. Writes for one
//! database instance are serialized by the executor, reads run unaffected
//! on other pool connections.

pub mod backup;
pub mod executor;
pub mod nickname;
pub mod register_player;
pub mod remove_player;
pub mod settings;
pub mod store_server;
pub mod store_session;
pub mod store_tps;
pub mod transfer;
pub mod user_info;

pub use backup::BackupCopy;
pub use executor::{TransactionExecutor, TransactionHandle};
pub use nickname::StoreNicknameTransaction;
pub use register_player::RegisterPlayerTransaction;
pub use remove_player::RemovePlayerTransaction;
pub use settings::StoreSettingsTransaction;
pub use store_server::StoreServerTransaction;
pub use store_session::StoreSessionTransaction;
pub use store_tps::{StorePingTransaction, StoreTpsTransaction};
pub use transfer::StoreTransferTransaction;
pub use user_info::{RegisterUserInfoTransaction, SetBanStatusTransaction, SetOperatorStatusTransaction};

use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::db::Dialect;
use crate::error::{Result, StorageError};
use crate::schema::tables::{players, servers, worlds};

/// An open sqlx transaction against the `Any` driver.
pub type AnyTx<'c> = sqlx::Transaction<'c, sqlx::Any>;

/// One atomic unit of write work.
#[async_trait]
pub trait WriteTransaction: Send + 'static {
    /// Name used in logs and error context.
    fn name(&self) -> &'static str;

    /// Applies every statement on the open transaction. Returning an error
    /// rolls the whole transaction back.
    async fn apply(&mut self, tx: &mut AnyTx<'_>, dialect: Dialect) -> Result<()>;
}

/// Row id of a server by UUID, if registered.
pub(crate) async fn server_id(tx: &mut AnyTx<'_>, uuid: Uuid) -> Result<Option<i64>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM {} WHERE {} = ?",
        servers::ID,
        servers::TABLE,
        servers::UUID
    ))
    .bind(uuid.to_string())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| StorageError::operation("server_id", uuid.to_string(), e))?;

    row.map(|r| {
        r.try_get::<i64, _>(0)
            .map_err(|e| StorageError::operation("server_id", uuid.to_string(), e))
    })
    .transpose()
}

/// Row id of a player by UUID, if registered.
pub(crate) async fn player_id(tx: &mut AnyTx<'_>, uuid: Uuid) -> Result<Option<i64>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM {} WHERE {} = ?",
        players::ID,
        players::TABLE,
        players::UUID
    ))
    .bind(uuid.to_string())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| StorageError::operation("player_id", uuid.to_string(), e))?;

    row.map(|r| {
        r.try_get::<i64, _>(0)
            .map_err(|e| StorageError::operation("player_id", uuid.to_string(), e))
    })
    .transpose()
}

/// Like [`server_id`] but a missing server is a data inconsistency: callers
/// use this when the row is required to exist already.
pub(crate) async fn require_server_id(
    tx: &mut AnyTx<'_>,
    operation: &'static str,
    uuid: Uuid,
) -> Result<i64> {
    server_id(tx, uuid).await?.ok_or_else(|| {
        StorageError::inconsistency(operation, format!("server {uuid} is not registered"))
    })
}

/// Like [`player_id`] but a missing player is a data inconsistency.
pub(crate) async fn require_player_id(
    tx: &mut AnyTx<'_>,
    operation: &'static str,
    uuid: Uuid,
) -> Result<i64> {
    player_id(tx, uuid).await?.ok_or_else(|| {
        StorageError::inconsistency(operation, format!("player {uuid} is not registered"))
    })
}

/// Row id of a world by (server, name), inserting the world when missing.
pub(crate) async fn ensure_world_id(
    tx: &mut AnyTx<'_>,
    operation: &'static str,
    server_row_id: i64,
    world: &str,
) -> Result<i64> {
    let select = format!(
        "SELECT {} FROM {} WHERE {} = ? AND {} = ?",
        worlds::ID,
        worlds::TABLE,
        worlds::SERVER_ID,
        worlds::NAME
    );

    if let Some(row) = sqlx::query(&select)
        .bind(server_row_id)
        .bind(world)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| StorageError::operation(operation, format!("world {world}"), e))?
    {
        return row
            .try_get::<i64, _>(0)
            .map_err(|e| StorageError::operation(operation, format!("world {world}"), e));
    }

    sqlx::query(&format!(
        "INSERT INTO {} ({}, {}) VALUES (?, ?)",
        worlds::TABLE,
        worlds::SERVER_ID,
        worlds::NAME
    ))
    .bind(server_row_id)
    .bind(world)
    .execute(&mut **tx)
    .await
    .map_err(|e| StorageError::operation(operation, format!("world {world}"), e))?;

    let row = sqlx::query(&select)
        .bind(server_row_id)
        .bind(world)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| StorageError::operation(operation, format!("world {world}"), e))?;
    row.try_get::<i64, _>(0)
        .map_err(|e| StorageError::operation(operation, format!("world {world}"), e))
}
