//! Cross-server data hand-off rows.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::Dialect;
use crate::error::{Result, StorageError};
use crate::schema::tables::transfer;

use super::{require_server_id, AnyTx, WriteTransaction};

/// Stores a payload for other servers to pick up, dropping expired rows of
/// the same content type first. Payloads are opaque to the storage layer.
pub struct StoreTransferTransaction {
    pub sender: Uuid,
    pub expiry: i64,
    pub content_type: String,
    pub extra_variables: Option<String>,
    pub content: String,
}

#[async_trait]
impl WriteTransaction for StoreTransferTransaction {
    fn name(&self) -> &'static str {
        "store_transfer"
    }

    async fn apply(&mut self, tx: &mut AnyTx<'_>, _dialect: Dialect) -> Result<()> {
        let op = self.name();
        let context = || format!("content type {}", self.content_type);
        let sender = require_server_id(tx, op, self.sender).await?;

        sqlx::query(&format!(
            "DELETE FROM {} WHERE {} = ? AND {} < ?",
            transfer::TABLE,
            transfer::CONTENT_TYPE,
            transfer::EXPIRY
        ))
        .bind(self.content_type.clone())
        .bind(shared::time::now_ms())
        .execute(&mut **tx)
        .await
        .map_err(|e| StorageError::operation(op, context(), e))?;

        sqlx::query(&format!(
            "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?)",
            transfer::TABLE,
            transfer::SENDER_SERVER_ID,
            transfer::EXPIRY,
            transfer::CONTENT_TYPE,
            transfer::EXTRA_VARIABLES,
            transfer::CONTENT
        ))
        .bind(sender)
        .bind(self.expiry)
        .bind(self.content_type.clone())
        .bind(self.extra_variables.clone())
        .bind(self.content.clone())
        .execute(&mut **tx)
        .await
        .map_err(|e| StorageError::operation(op, context(), e))?;
        Ok(())
    }
}
