//! Server registry queries.

use domain::models::Server;
use sqlx::{AnyPool, Row};
use uuid::Uuid;

use crate::entities::ServerEntity;
use crate::error::{Result, StorageError};
use crate::metrics::QueryTimer;
use crate::schema::tables::{servers, settings, transfer};

/// Read-only queries over the servers and settings tables.
#[derive(Clone)]
pub struct ServerQueries {
    pool: AnyPool,
}

impl ServerQueries {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    fn select_columns() -> String {
        format!(
            "{}, {}, {}, {}, {}",
            servers::ID,
            servers::UUID,
            servers::NAME,
            servers::WEB_ADDRESS,
            servers::IS_PROXY
        )
    }

    /// One server by UUID.
    pub async fn fetch_server(&self, uuid: Uuid) -> Result<Option<Server>> {
        let timer = QueryTimer::new("fetch_server");
        let entity = sqlx::query_as::<_, ServerEntity>(&format!(
            "SELECT {} FROM {} WHERE {} = ?",
            Self::select_columns(),
            servers::TABLE,
            servers::UUID
        ))
        .bind(uuid.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::operation("fetch_server", uuid.to_string(), e))?;
        timer.record();

        entity.map(ServerEntity::into_domain).transpose()
    }

    /// All registered servers ordered by row id.
    pub async fn fetch_servers(&self) -> Result<Vec<Server>> {
        let timer = QueryTimer::new("fetch_servers");
        let entities = sqlx::query_as::<_, ServerEntity>(&format!(
            "SELECT {} FROM {} ORDER BY {}",
            Self::select_columns(),
            servers::TABLE,
            servers::ID
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::operation("fetch_servers", "all", e))?;
        timer.record();

        entities
            .into_iter()
            .map(ServerEntity::into_domain)
            .collect()
    }

    /// The latest stored settings blob of a server, with its update time.
    pub async fn fetch_settings(&self, server: Uuid) -> Result<Option<(i64, String)>> {
        let timer = QueryTimer::new("fetch_settings");
        let row = sqlx::query(&format!(
            "SELECT {}, {} FROM {} WHERE {} = ?",
            settings::UPDATED,
            settings::CONTENT,
            settings::TABLE,
            settings::SERVER_UUID
        ))
        .bind(server.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::operation("fetch_settings", server.to_string(), e))?;
        timer.record();

        row.map(|r| {
            let updated: i64 = r
                .try_get(0)
                .map_err(|e| StorageError::operation("fetch_settings", server.to_string(), e))?;
            let content: String = r
                .try_get(1)
                .map_err(|e| StorageError::operation("fetch_settings", server.to_string(), e))?;
            Ok((updated, content))
        })
        .transpose()
    }

    /// The newest unexpired transfer payload of one content type, with its
    /// extra variables.
    pub async fn fetch_transfer(
        &self,
        content_type: &str,
        now: i64,
    ) -> Result<Option<(Option<String>, String)>> {
        let operation = "fetch_transfer";
        let timer = QueryTimer::new(operation);
        let row = sqlx::query(&format!(
            "SELECT {}, {} FROM {} WHERE {} = ? AND {} >= ? ORDER BY {} DESC LIMIT 1",
            transfer::EXTRA_VARIABLES,
            transfer::CONTENT,
            transfer::TABLE,
            transfer::CONTENT_TYPE,
            transfer::EXPIRY,
            transfer::EXPIRY
        ))
        .bind(content_type.to_string())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::operation(operation, content_type.to_string(), e))?;
        timer.record();

        row.map(|r| {
            let extra: Option<String> = r
                .try_get(0)
                .map_err(|e| StorageError::operation(operation, content_type.to_string(), e))?;
            let content: String = r
                .try_get(1)
                .map_err(|e| StorageError::operation(operation, content_type.to_string(), e))?;
            Ok((extra, content))
        })
        .transpose()
    }
}
