//! The fixed Playtrack table set.
//!
//! UUIDs are stored as 36-character strings, timestamps and durations as
//! 64-bit epoch/interval milliseconds. `all_tables` lists tables in
//! foreign-key order; creation and backup copying both follow it.

use super::{Column, ColumnKind, Table};

pub mod servers {
    pub const TABLE: &str = "servers";
    pub const ID: &str = "id";
    pub const UUID: &str = "uuid";
    pub const NAME: &str = "name";
    pub const WEB_ADDRESS: &str = "web_address";
    pub const IS_PROXY: &str = "is_proxy";
}

pub mod players {
    pub const TABLE: &str = "players";
    pub const ID: &str = "id";
    pub const UUID: &str = "uuid";
    pub const NAME: &str = "name";
    pub const REGISTERED: &str = "registered";
}

pub mod user_info {
    pub const TABLE: &str = "user_info";
    pub const USER_ID: &str = "user_id";
    pub const SERVER_ID: &str = "server_id";
    pub const REGISTERED: &str = "registered";
    pub const OP: &str = "opped";
    pub const BANNED: &str = "banned";
}

pub mod nicknames {
    pub const TABLE: &str = "nicknames";
    pub const USER_ID: &str = "user_id";
    pub const SERVER_ID: &str = "server_id";
    pub const NICKNAME: &str = "nickname";
    pub const LAST_USED: &str = "last_used";
}

pub mod worlds {
    pub const TABLE: &str = "worlds";
    pub const ID: &str = "id";
    pub const SERVER_ID: &str = "server_id";
    pub const NAME: &str = "world_name";
}

pub mod sessions {
    pub const TABLE: &str = "sessions";
    pub const ID: &str = "id";
    pub const USER_ID: &str = "user_id";
    pub const SERVER_ID: &str = "server_id";
    pub const START: &str = "session_start";
    pub const END: &str = "session_end";
    pub const AFK_TIME: &str = "afk_time";
    pub const DEATHS: &str = "deaths";
    pub const MOB_KILLS: &str = "mob_kills";
}

pub mod world_times {
    pub const TABLE: &str = "world_times";
    pub const SESSION_ID: &str = "session_id";
    pub const WORLD_ID: &str = "world_id";
    pub const SURVIVAL: &str = "survival_time";
    pub const CREATIVE: &str = "creative_time";
    pub const ADVENTURE: &str = "adventure_time";
    pub const SPECTATOR: &str = "spectator_time";
}

pub mod kills {
    pub const TABLE: &str = "kills";
    pub const SESSION_ID: &str = "session_id";
    pub const KILLER_UUID: &str = "killer_uuid";
    pub const VICTIM_UUID: &str = "victim_uuid";
    pub const WEAPON: &str = "weapon";
    pub const DATE: &str = "date";
}

pub mod tps {
    pub const TABLE: &str = "tps";
    pub const SERVER_ID: &str = "server_id";
    pub const DATE: &str = "date";
    pub const TPS: &str = "tps";
    pub const PLAYERS_ONLINE: &str = "players_online";
    pub const CPU_USAGE: &str = "cpu_usage";
    pub const RAM_USAGE: &str = "ram_usage";
    pub const ENTITIES: &str = "entities";
    pub const CHUNKS: &str = "chunks_loaded";
    pub const FREE_DISK: &str = "free_disk_space";
}

pub mod ping {
    pub const TABLE: &str = "ping";
    pub const USER_ID: &str = "user_id";
    pub const SERVER_ID: &str = "server_id";
    pub const DATE: &str = "date";
    pub const MIN_PING: &str = "min_ping";
    pub const MAX_PING: &str = "max_ping";
    pub const AVG_PING: &str = "avg_ping";
}

pub mod settings {
    pub const TABLE: &str = "settings";
    pub const SERVER_UUID: &str = "server_uuid";
    pub const UPDATED: &str = "updated";
    pub const CONTENT: &str = "content";
}

pub mod transfer {
    pub const TABLE: &str = "transfer";
    pub const SENDER_SERVER_ID: &str = "sender_server_id";
    pub const EXPIRY: &str = "expiry";
    pub const CONTENT_TYPE: &str = "content_type";
    pub const EXTRA_VARIABLES: &str = "extra_variables";
    pub const CONTENT: &str = "content";
}

pub mod schema_versions {
    pub const TABLE: &str = "schema_versions";
    pub const VERSION: &str = "version";
    pub const NAME: &str = "name";
    pub const APPLIED: &str = "applied";
}

pub fn servers_table() -> Table {
    Table::new(
        servers::TABLE,
        vec![
            Column::auto_id(servers::ID),
            Column::new(servers::UUID, ColumnKind::Varchar(36)).unique(),
            Column::new(servers::NAME, ColumnKind::Varchar(100)),
            Column::new(servers::WEB_ADDRESS, ColumnKind::Varchar(100)).nullable(),
            Column::new(servers::IS_PROXY, ColumnKind::Bool).default("0"),
        ],
    )
}

pub fn players_table() -> Table {
    Table::new(
        players::TABLE,
        vec![
            Column::auto_id(players::ID),
            Column::new(players::UUID, ColumnKind::Varchar(36)).unique(),
            Column::new(players::NAME, ColumnKind::Varchar(36)),
            Column::new(players::REGISTERED, ColumnKind::Long),
        ],
    )
}

pub fn user_info_table() -> Table {
    Table::new(
        user_info::TABLE,
        vec![
            Column::new(user_info::USER_ID, ColumnKind::Int),
            Column::new(user_info::SERVER_ID, ColumnKind::Int),
            Column::new(user_info::REGISTERED, ColumnKind::Long),
            Column::new(user_info::OP, ColumnKind::Bool).default("0"),
            Column::new(user_info::BANNED, ColumnKind::Bool).default("0"),
        ],
    )
    .foreign_key(user_info::USER_ID, players::TABLE, players::ID)
    .foreign_key(user_info::SERVER_ID, servers::TABLE, servers::ID)
}

pub fn nicknames_table() -> Table {
    Table::new(
        nicknames::TABLE,
        vec![
            Column::new(nicknames::USER_ID, ColumnKind::Int),
            Column::new(nicknames::SERVER_ID, ColumnKind::Int),
            Column::new(nicknames::NICKNAME, ColumnKind::Varchar(75)),
            Column::new(nicknames::LAST_USED, ColumnKind::Long).default("0"),
        ],
    )
    .foreign_key(nicknames::USER_ID, players::TABLE, players::ID)
    .foreign_key(nicknames::SERVER_ID, servers::TABLE, servers::ID)
}

pub fn worlds_table() -> Table {
    Table::new(
        worlds::TABLE,
        vec![
            Column::auto_id(worlds::ID),
            Column::new(worlds::SERVER_ID, ColumnKind::Int),
            Column::new(worlds::NAME, ColumnKind::Varchar(100)),
        ],
    )
    .foreign_key(worlds::SERVER_ID, servers::TABLE, servers::ID)
}

pub fn sessions_table() -> Table {
    Table::new(
        sessions::TABLE,
        vec![
            Column::auto_id(sessions::ID),
            Column::new(sessions::USER_ID, ColumnKind::Int),
            Column::new(sessions::SERVER_ID, ColumnKind::Int),
            Column::new(sessions::START, ColumnKind::Long),
            Column::new(sessions::END, ColumnKind::Long),
            Column::new(sessions::AFK_TIME, ColumnKind::Long).default("0"),
            Column::new(sessions::DEATHS, ColumnKind::Int).default("0"),
            Column::new(sessions::MOB_KILLS, ColumnKind::Int).default("0"),
        ],
    )
    .foreign_key(sessions::USER_ID, players::TABLE, players::ID)
    .foreign_key(sessions::SERVER_ID, servers::TABLE, servers::ID)
}

pub fn world_times_table() -> Table {
    Table::new(
        world_times::TABLE,
        vec![
            Column::new(world_times::SESSION_ID, ColumnKind::Int),
            Column::new(world_times::WORLD_ID, ColumnKind::Int),
            Column::new(world_times::SURVIVAL, ColumnKind::Long).default("0"),
            Column::new(world_times::CREATIVE, ColumnKind::Long).default("0"),
            Column::new(world_times::ADVENTURE, ColumnKind::Long).default("0"),
            Column::new(world_times::SPECTATOR, ColumnKind::Long).default("0"),
        ],
    )
    .foreign_key(world_times::SESSION_ID, sessions::TABLE, sessions::ID)
    .foreign_key(world_times::WORLD_ID, worlds::TABLE, worlds::ID)
}

pub fn kills_table() -> Table {
    Table::new(
        kills::TABLE,
        vec![
            Column::new(kills::SESSION_ID, ColumnKind::Int),
            Column::new(kills::KILLER_UUID, ColumnKind::Varchar(36)),
            Column::new(kills::VICTIM_UUID, ColumnKind::Varchar(36)),
            Column::new(kills::WEAPON, ColumnKind::Varchar(30)),
            Column::new(kills::DATE, ColumnKind::Long),
        ],
    )
    .foreign_key(kills::SESSION_ID, sessions::TABLE, sessions::ID)
}

pub fn tps_table() -> Table {
    Table::new(
        tps::TABLE,
        vec![
            Column::new(tps::SERVER_ID, ColumnKind::Int),
            Column::new(tps::DATE, ColumnKind::Long),
            Column::new(tps::TPS, ColumnKind::Double),
            Column::new(tps::PLAYERS_ONLINE, ColumnKind::Int),
            Column::new(tps::CPU_USAGE, ColumnKind::Double).default("-1"),
            Column::new(tps::RAM_USAGE, ColumnKind::Long).default("-1"),
            Column::new(tps::ENTITIES, ColumnKind::Int).default("-1"),
            Column::new(tps::CHUNKS, ColumnKind::Int).default("-1"),
            Column::new(tps::FREE_DISK, ColumnKind::Long).default("-1"),
        ],
    )
    .foreign_key(tps::SERVER_ID, servers::TABLE, servers::ID)
}

pub fn ping_table() -> Table {
    Table::new(
        ping::TABLE,
        vec![
            Column::new(ping::USER_ID, ColumnKind::Int),
            Column::new(ping::SERVER_ID, ColumnKind::Int),
            Column::new(ping::DATE, ColumnKind::Long),
            Column::new(ping::MIN_PING, ColumnKind::Int),
            Column::new(ping::MAX_PING, ColumnKind::Int),
            Column::new(ping::AVG_PING, ColumnKind::Double),
        ],
    )
    .foreign_key(ping::USER_ID, players::TABLE, players::ID)
    .foreign_key(ping::SERVER_ID, servers::TABLE, servers::ID)
}

pub fn settings_table() -> Table {
    Table::new(
        settings::TABLE,
        vec![
            Column::new(settings::SERVER_UUID, ColumnKind::Varchar(36)).unique(),
            Column::new(settings::UPDATED, ColumnKind::Long),
            Column::new(settings::CONTENT, ColumnKind::Text),
        ],
    )
}

pub fn transfer_table() -> Table {
    Table::new(
        transfer::TABLE,
        vec![
            Column::new(transfer::SENDER_SERVER_ID, ColumnKind::Int),
            Column::new(transfer::EXPIRY, ColumnKind::Long).default("0"),
            Column::new(transfer::CONTENT_TYPE, ColumnKind::Varchar(100)).nullable(),
            Column::new(transfer::EXTRA_VARIABLES, ColumnKind::Varchar(255)).nullable(),
            Column::new(transfer::CONTENT, ColumnKind::Text).nullable(),
        ],
    )
    .foreign_key(transfer::SENDER_SERVER_ID, servers::TABLE, servers::ID)
}

pub fn schema_versions_table() -> Table {
    Table::new(
        schema_versions::TABLE,
        vec![
            Column::new(schema_versions::VERSION, ColumnKind::Int).unique(),
            Column::new(schema_versions::NAME, ColumnKind::Varchar(100)),
            Column::new(schema_versions::APPLIED, ColumnKind::Long),
        ],
    )
}

/// Every table in foreign-key order: referenced tables before referencing
/// ones. Creation and backup copying both iterate this list.
pub fn all_tables() -> Vec<Table> {
    vec![
        servers_table(),
        players_table(),
        user_info_table(),
        nicknames_table(),
        worlds_table(),
        sessions_table(),
        world_times_table(),
        kills_table(),
        tps_table(),
        ping_table(),
        settings_table(),
        transfer_table(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn foreign_keys_reference_earlier_tables() {
        let mut seen: HashSet<&str> = HashSet::new();
        for table in all_tables() {
            for fk in &table.foreign_keys {
                assert!(
                    seen.contains(fk.references_table),
                    "{} references {} before it is created",
                    table.name,
                    fk.references_table
                );
            }
            seen.insert(table.name);
        }
    }

    #[test]
    fn table_names_are_unique() {
        let tables = all_tables();
        let names: HashSet<&str> = tables.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), tables.len());
    }
}
