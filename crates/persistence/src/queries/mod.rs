//! Read-only, parameterized query objects.
//!
//! Every time-scoped operation takes a half-open `[from, to)` epoch-ms
//! window and optional server/player scope, and returns typed results. All
//! queries are pure with respect to their parameters: identical inputs
//! against an unchanged database return identical outputs.

pub mod kill_queries;
pub mod ping_queries;
pub mod player_queries;
pub mod server_queries;
pub mod session_queries;
pub mod tps_queries;

use sqlx::{AnyPool, Row};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::schema::tables::{players, servers};

pub use kill_queries::KillQueries;
pub use ping_queries::PingQueries;
pub use player_queries::PlayerQueries;
pub use server_queries::ServerQueries;
pub use session_queries::SessionQueries;
pub use tps_queries::TpsQueries;

/// Resolves a server scope to its row id once, so scoped queries bind an
/// integer instead of embedding a correlated subquery. `None` means the
/// server is unknown; scoped queries then return empty results.
pub(crate) async fn server_row_id(pool: &AnyPool, uuid: Uuid) -> Result<Option<i64>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM {} WHERE {} = ?",
        servers::ID,
        servers::TABLE,
        servers::UUID
    ))
    .bind(uuid.to_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| StorageError::operation("server_row_id", uuid.to_string(), e))?;

    row.map(|r| {
        r.try_get::<i64, _>(0)
            .map_err(|e| StorageError::operation("server_row_id", uuid.to_string(), e))
    })
    .transpose()
}

/// Resolves a player scope to its row id once. See [`server_row_id`].
pub(crate) async fn player_row_id(pool: &AnyPool, uuid: Uuid) -> Result<Option<i64>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM {} WHERE {} = ?",
        players::ID,
        players::TABLE,
        players::UUID
    ))
    .bind(uuid.to_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| StorageError::operation("player_row_id", uuid.to_string(), e))?;

    row.map(|r| {
        r.try_get::<i64, _>(0)
            .map_err(|e| StorageError::operation("player_row_id", uuid.to_string(), e))
    })
    .transpose()
}
