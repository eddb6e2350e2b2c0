//! Pure metric computations over already-fetched data.

pub mod activity;
pub mod math;
pub mod ping_mutator;
pub mod sessions_mutator;
pub mod tps_mutator;

pub use activity::activity_index;
pub use math::{kdr, Percentage};
pub use ping_mutator::PingMutator;
pub use sessions_mutator::SessionsMutator;
pub use tps_mutator::TpsMutator;
