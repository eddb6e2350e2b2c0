//! Game server identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A game server known to the storage layer.
///
/// Identity is the UUID; the numeric row id is assigned by storage and only
/// appears on entities. Name and web address are mutable, everything else is
/// fixed at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub uuid: Uuid,
    pub name: String,
    pub web_address: Option<String>,
    /// Proxy servers (e.g. a network front) aggregate sessions from the
    /// servers behind them and carry no world data of their own.
    pub proxy: bool,
}

impl Server {
    pub fn new(uuid: Uuid, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
            web_address: None,
            proxy: false,
        }
    }
}
