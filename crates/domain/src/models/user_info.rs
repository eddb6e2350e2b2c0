//! Per-server player facts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Facts about a player on one specific server, distinct from the global
/// Player registration. One row per (player, server) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub player: Uuid,
    pub server: Uuid,
    /// Registration on this server, epoch ms.
    pub registered: i64,
    pub operator: bool,
    pub banned: bool,
}
