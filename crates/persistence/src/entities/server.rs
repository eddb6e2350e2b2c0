//! Server entity (database row mapping).

use domain::models::Server;
use sqlx::FromRow;

use crate::error::StorageError;

use super::parse_uuid;

/// Database row mapping for the servers table.
#[derive(Debug, Clone, FromRow)]
pub struct ServerEntity {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub web_address: Option<String>,
    pub is_proxy: i64,
}

impl ServerEntity {
    pub fn into_domain(self) -> Result<Server, StorageError> {
        Ok(Server {
            uuid: parse_uuid("server row", &self.uuid)?,
            name: self.name,
            web_address: self.web_address,
            proxy: self.is_proxy != 0,
        })
    }
}
