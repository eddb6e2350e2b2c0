//! Database entity definitions.
//!
//! Entities are direct mappings to database rows. UUID columns arrive as
//! 36-character strings and flags as 0/1 integers (the `Any` driver's common
//! denominator across MySQL and SQLite); `into_domain` conversions produce
//! the typed domain models and report malformed rows as data inconsistency.

pub mod ping;
pub mod player;
pub mod server;
pub mod session;
pub mod tps;
pub mod user_info;

pub use ping::PingEntity;
pub use player::{NicknameEntity, PlayerEntity};
pub use server::ServerEntity;
pub use session::{KillEntity, SessionEntity, WorldTimeEntity};
pub use tps::TpsEntity;
pub use user_info::UserInfoEntity;

use uuid::Uuid;

use crate::error::StorageError;

/// Parses a stored 36-character UUID, reporting a malformed value as a
/// data-inconsistency error naming the operation.
pub(crate) fn parse_uuid(operation: &'static str, value: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(value)
        .map_err(|_| StorageError::inconsistency(operation, format!("malformed uuid '{value}'")))
}
