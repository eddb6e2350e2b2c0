//! TPS entity (database row mapping).

use domain::models::TpsSample;
use sqlx::FromRow;

/// Database row mapping for the tps table.
#[derive(Debug, Clone, FromRow)]
pub struct TpsEntity {
    pub date: i64,
    pub tps: f64,
    pub players_online: i64,
    pub cpu_usage: f64,
    pub ram_usage: i64,
    pub entities: i64,
    pub chunks_loaded: i64,
    pub free_disk_space: i64,
}

impl From<TpsEntity> for TpsSample {
    fn from(entity: TpsEntity) -> Self {
        Self {
            date: entity.date,
            tps: entity.tps,
            players_online: entity.players_online as i32,
            cpu_usage: entity.cpu_usage,
            ram_usage: entity.ram_usage,
            entities: entity.entities as i32,
            chunks_loaded: entity.chunks_loaded as i32,
            free_disk: entity.free_disk_space,
        }
    }
}
