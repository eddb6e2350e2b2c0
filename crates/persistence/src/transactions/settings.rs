//! Server settings blob sync.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::Dialect;
use crate::error::{Result, StorageError};
use crate::schema::tables::settings;

use super::{AnyTx, WriteTransaction};

/// Stores a server's serialized settings blob, replacing any previous one.
///
/// Used to propagate configuration between a proxy and the servers behind
/// it; the content is opaque to the storage layer.
pub struct StoreSettingsTransaction {
    pub server: Uuid,
    pub content: String,
    pub updated: i64,
}

#[async_trait]
impl WriteTransaction for StoreSettingsTransaction {
    fn name(&self) -> &'static str {
        "store_settings"
    }

    async fn apply(&mut self, tx: &mut AnyTx<'_>, _dialect: Dialect) -> Result<()> {
        let op = self.name();
        let uuid = self.server.to_string();

        let updated = sqlx::query(&format!(
            "UPDATE {} SET {} = ?, {} = ? WHERE {} = ?",
            settings::TABLE,
            settings::CONTENT,
            settings::UPDATED,
            settings::SERVER_UUID
        ))
        .bind(self.content.clone())
        .bind(self.updated)
        .bind(uuid.clone())
        .execute(&mut **tx)
        .await
        .map_err(|e| StorageError::operation(op, uuid.clone(), e))?
        .rows_affected();

        if updated == 0 {
            sqlx::query(&format!(
                "INSERT INTO {} ({}, {}, {}) VALUES (?, ?, ?)",
                settings::TABLE,
                settings::SERVER_UUID,
                settings::UPDATED,
                settings::CONTENT
            ))
            .bind(uuid.clone())
            .bind(self.updated)
            .bind(self.content.clone())
            .execute(&mut **tx)
            .await
            .map_err(|e| StorageError::operation(op, uuid, e))?;
        }
        Ok(())
    }
}
