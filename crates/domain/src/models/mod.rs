//! Domain models for Playtrack.

pub mod activity_index;
pub mod ping;
pub mod player;
pub mod server;
pub mod session;
pub mod tps;
pub mod trend;
pub mod user_info;
pub mod world_times;

pub use activity_index::{ActivityGroup, ActivityIndex};
pub use ping::PingSample;
pub use player::{Nickname, Player};
pub use server::Server;
pub use session::{PlayerKill, Session};
pub use tps::TpsSample;
pub use trend::{Trend, TrendDirection};
pub use user_info::UserInfo;
pub use world_times::{GameMode, GameModeTimes, WorldTimes};
