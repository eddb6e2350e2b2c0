//! Insight builders.
//!
//! Builders compose query objects and metric mutators into serializable
//! reports. Every field is independently failable: a storage error degrades
//! that field to `None` (or a sentinel) with a warning, and the report still
//! builds from whatever data was reachable.

pub mod player_overview;
pub mod server_overview;

pub use player_overview::{PlayerOverview, PlayerOverviewBuilder};
pub use server_overview::{PeakPlayers, ServerOverview, ServerOverviewBuilder};

use persistence::error::StorageError;
use tracing::warn;

/// Degrades a failed field to `None` and logs the failure.
fn field<T>(report: &'static str, name: &'static str, result: Result<T, StorageError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(report, field = name, error = %e, "Report field unavailable");
            None
        }
    }
}
