//! Ping samples.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Min/max/average ping of a player over one sampling window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingSample {
    pub player: Uuid,
    pub server: Uuid,
    /// End of the sampling window, epoch ms.
    pub date: i64,
    pub min_ms: i32,
    pub max_ms: i32,
    pub avg_ms: f64,
}
