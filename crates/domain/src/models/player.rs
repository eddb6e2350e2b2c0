//! Player identity and nickname history.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A player known to the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub uuid: Uuid,
    /// Most recently seen name.
    pub name: String,
    /// First registration across all servers, epoch ms.
    pub registered: i64,
}

/// One nickname a player has used on a specific server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nickname {
    pub player: Uuid,
    pub server: Uuid,
    pub name: String,
    /// Last time this nickname was observed, epoch ms.
    pub last_used: i64,
}
