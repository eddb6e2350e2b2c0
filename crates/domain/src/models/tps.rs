//! Server performance samples.

use serde::{Deserialize, Serialize};

/// Sentinel for "value was not measured" in a TPS sample.
///
/// Averages skip sentinel values instead of pulling the mean toward zero.
pub const UNMEASURED: f64 = -1.0;

/// One periodic server health snapshot.
///
/// Samples for a server are monotonically increasing in `date`; gaps between
/// consecutive samples beyond the expected sampling interval are treated as
/// server downtime, not lag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TpsSample {
    /// Sample time, epoch ms.
    pub date: i64,
    /// Ticks per second, -1.0 when not measured.
    pub tps: f64,
    pub players_online: i32,
    /// CPU usage percentage 0-100, -1.0 when not measured.
    pub cpu_usage: f64,
    /// RAM usage in bytes, -1 when not measured.
    pub ram_usage: i64,
    pub entities: i32,
    pub chunks_loaded: i32,
    /// Free disk space in bytes, -1 when not measured.
    pub free_disk: i64,
}
