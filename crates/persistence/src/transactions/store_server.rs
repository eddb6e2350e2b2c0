//! Server registration and detail updates.

use async_trait::async_trait;
use domain::models::Server;

use crate::db::Dialect;
use crate::error::{Result, StorageError};
use crate::schema::tables::servers;

use super::{server_id, AnyTx, WriteTransaction};

/// Registers a server or updates its mutable details (name, web address).
pub struct StoreServerTransaction {
    pub server: Server,
}

#[async_trait]
impl WriteTransaction for StoreServerTransaction {
    fn name(&self) -> &'static str {
        "store_server"
    }

    async fn apply(&mut self, tx: &mut AnyTx<'_>, _dialect: Dialect) -> Result<()> {
        let uuid = self.server.uuid;
        let context = || uuid.to_string();

        if server_id(tx, uuid).await?.is_some() {
            sqlx::query(&format!(
                "UPDATE {} SET {} = ?, {} = ?, {} = ? WHERE {} = ?",
                servers::TABLE,
                servers::NAME,
                servers::WEB_ADDRESS,
                servers::IS_PROXY,
                servers::UUID
            ))
            .bind(self.server.name.clone())
            .bind(self.server.web_address.clone())
            .bind(self.server.proxy as i64)
            .bind(uuid.to_string())
            .execute(&mut **tx)
            .await
            .map_err(|e| StorageError::operation(self.name(), context(), e))?;
        } else {
            sqlx::query(&format!(
                "INSERT INTO {} ({}, {}, {}, {}) VALUES (?, ?, ?, ?)",
                servers::TABLE,
                servers::UUID,
                servers::NAME,
                servers::WEB_ADDRESS,
                servers::IS_PROXY
            ))
            .bind(uuid.to_string())
            .bind(self.server.name.clone())
            .bind(self.server.web_address.clone())
            .bind(self.server.proxy as i64)
            .execute(&mut **tx)
            .await
            .map_err(|e| StorageError::operation(self.name(), context(), e))?;
        }
        Ok(())
    }
}
