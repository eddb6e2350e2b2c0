//! Session queries: playtime, counts and full session fetches.

use std::collections::HashMap;

use domain::models::Session;
use sqlx::{AnyPool, Row};
use uuid::Uuid;

use crate::entities::{KillEntity, SessionEntity, WorldTimeEntity};
use crate::error::{Result, StorageError};
use crate::metrics::QueryTimer;
use crate::schema::tables::{players, servers, sessions, world_times, worlds};
use crate::schema::tables::kills;
use crate::sql;

use super::{player_row_id, server_row_id};

/// Optional scoping shared by the session queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionScope {
    pub server: Option<Uuid>,
    pub player: Option<Uuid>,
}

impl SessionScope {
    pub fn server(server: Uuid) -> Self {
        Self {
            server: Some(server),
            player: None,
        }
    }

    pub fn player(player: Uuid) -> Self {
        Self {
            server: None,
            player: Some(player),
        }
    }

    pub fn and_player(mut self, player: Uuid) -> Self {
        self.player = Some(player);
        self
    }
}

/// Resolved row-id scope. `None` when the scoped entity does not exist.
struct ResolvedScope {
    server: Option<i64>,
    player: Option<i64>,
}

/// Read-only queries over sessions and their owned tables.
#[derive(Clone)]
pub struct SessionQueries {
    pool: AnyPool,
}

impl SessionQueries {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Resolves scope UUIDs to row ids; `Ok(None)` means a scoped entity is
    /// unknown and the query result is trivially empty.
    async fn resolve(&self, scope: SessionScope) -> Result<Option<ResolvedScope>> {
        let server = match scope.server {
            Some(uuid) => match server_row_id(&self.pool, uuid).await? {
                Some(id) => Some(id),
                None => return Ok(None),
            },
            None => None,
        };
        let player = match scope.player {
            Some(uuid) => match player_row_id(&self.pool, uuid).await? {
                Some(id) => Some(id),
                None => return Ok(None),
            },
            None => None,
        };
        Ok(Some(ResolvedScope { server, player }))
    }

    /// `WHERE` tail for the overlap window plus resolved scope, with the
    /// binds it expects after any select-list parameters.
    fn overlap_filter(scope: &ResolvedScope) -> (String, Vec<i64>) {
        let mut sql = format!(
            "s.{} < ? AND s.{} > ?",
            sessions::START,
            sessions::END
        );
        let mut binds = Vec::new();
        if let Some(server) = scope.server {
            sql.push_str(&format!(" AND s.{} = ?", sessions::SERVER_ID));
            binds.push(server);
        }
        if let Some(player) = scope.player {
            sql.push_str(&format!(" AND s.{} = ?", sessions::USER_ID));
            binds.push(player);
        }
        (sql, binds)
    }

    async fn sum_query(
        &self,
        operation: &'static str,
        select: String,
        select_binds: Vec<i64>,
        from: i64,
        to: i64,
        scope: SessionScope,
    ) -> Result<i64> {
        let Some(resolved) = self.resolve(scope).await? else {
            return Ok(0);
        };
        let (filter, filter_binds) = Self::overlap_filter(&resolved);
        let sql = format!(
            "SELECT {} FROM {} s WHERE {}",
            select,
            sessions::TABLE,
            filter
        );

        let timer = QueryTimer::new(operation);
        let mut query = sqlx::query(&sql);
        for bind in select_binds {
            query = query.bind(bind);
        }
        query = query.bind(to).bind(from);
        for bind in filter_binds {
            query = query.bind(bind);
        }
        let value: i64 = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::operation(operation, format!("[{from}, {to})"), e))?
            .try_get(0)
            .map_err(|e| StorageError::operation(operation, format!("[{from}, {to})"), e))?;
        timer.record();
        Ok(value)
    }

    /// Total playtime in `[from, to)`: overlapping sessions contribute
    /// `min(end, to) - max(start, from)`, others contribute 0.
    pub async fn playtime(&self, from: i64, to: i64, scope: SessionScope) -> Result<i64> {
        let clamp = sql::overlap_clamp(
            &format!("s.{}", sessions::START),
            &format!("s.{}", sessions::END),
        );
        self.sum_query(
            "playtime",
            format!("CAST(COALESCE(SUM({clamp}), 0) AS SIGNED)"),
            vec![to, to, from, from],
            from,
            to,
            scope,
        )
        .await
    }

    /// Playtime averaged over the whole days of the window, ms per day.
    pub async fn average_playtime_per_day(
        &self,
        from: i64,
        to: i64,
        scope: SessionScope,
    ) -> Result<i64> {
        let playtime = self.playtime(from, to, scope).await?;
        Ok(playtime / shared::time::days_in(from, to))
    }

    /// Number of sessions overlapping `[from, to)`.
    pub async fn session_count(&self, from: i64, to: i64, scope: SessionScope) -> Result<i64> {
        self.sum_query("session_count", "COUNT(*)".to_string(), vec![], from, to, scope)
            .await
    }

    /// Total deaths in sessions overlapping `[from, to)`.
    pub async fn death_count(&self, from: i64, to: i64, scope: SessionScope) -> Result<i64> {
        self.sum_query(
            "death_count",
            format!("CAST(COALESCE(SUM(s.{}), 0) AS SIGNED)", sessions::DEATHS),
            vec![],
            from,
            to,
            scope,
        )
        .await
    }

    /// Total mob kills in sessions overlapping `[from, to)`.
    pub async fn mob_kill_count(&self, from: i64, to: i64, scope: SessionScope) -> Result<i64> {
        self.sum_query(
            "mob_kill_count",
            format!("CAST(COALESCE(SUM(s.{}), 0) AS SIGNED)", sessions::MOB_KILLS),
            vec![],
            from,
            to,
            scope,
        )
        .await
    }

    /// Distinct players with a session overlapping `[from, to)`.
    pub async fn unique_player_count(
        &self,
        from: i64,
        to: i64,
        scope: SessionScope,
    ) -> Result<i64> {
        self.sum_query(
            "unique_player_count",
            format!("COUNT(DISTINCT s.{})", sessions::USER_ID),
            vec![],
            from,
            to,
            scope,
        )
        .await
    }

    /// Players whose first session started in `[from, to)` and who came
    /// back at least `retention_ms` after it.
    pub async fn retained_player_count(
        &self,
        from: i64,
        to: i64,
        server: Option<Uuid>,
        retention_ms: i64,
    ) -> Result<i64> {
        let operation = "retained_player_count";
        let server_id = match server {
            Some(uuid) => match server_row_id(&self.pool, uuid).await? {
                Some(id) => Some(id),
                None => return Ok(0),
            },
            None => None,
        };

        let server_filter = match server_id {
            Some(_) => format!("WHERE {} = ? ", sessions::SERVER_ID),
            None => String::new(),
        };
        let sql = format!(
            "SELECT COUNT(*) FROM (\
               SELECT {user} FROM {table} {server_filter}\
               GROUP BY {user} \
               HAVING MIN({start}) >= ? AND MIN({start}) < ? \
                  AND MAX({start}) - MIN({start}) >= ?\
             ) retained",
            user = sessions::USER_ID,
            table = sessions::TABLE,
            server_filter = server_filter,
            start = sessions::START,
        );

        let timer = QueryTimer::new(operation);
        let mut query = sqlx::query(&sql);
        if let Some(id) = server_id {
            query = query.bind(id);
        }
        let count: i64 = query
            .bind(from)
            .bind(to)
            .bind(retention_ms)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::operation(operation, format!("[{from}, {to})"), e))?
            .try_get(0)
            .map_err(|e| StorageError::operation(operation, format!("[{from}, {to})"), e))?;
        timer.record();
        Ok(count)
    }

    /// Full sessions overlapping `[from, to)` with world times and kills,
    /// ordered by start time.
    pub async fn fetch_sessions(
        &self,
        from: i64,
        to: i64,
        scope: SessionScope,
    ) -> Result<Vec<Session>> {
        let operation = "fetch_sessions";
        let Some(resolved) = self.resolve(scope).await? else {
            return Ok(Vec::new());
        };
        let (filter, filter_binds) = Self::overlap_filter(&resolved);

        let timer = QueryTimer::new(operation);

        let session_sql = format!(
            "SELECT s.{id} AS id, p.{puuid} AS player_uuid, sv.{suuid} AS server_uuid, \
                    s.{start} AS session_start, s.{end} AS session_end, \
                    s.{afk} AS afk_time, s.{deaths} AS deaths, s.{mobs} AS mob_kills \
             FROM {sessions} s \
             JOIN {players} p ON s.{user} = p.{pid} \
             JOIN {servers} sv ON s.{server} = sv.{sid} \
             WHERE {filter} ORDER BY s.{start}",
            id = sessions::ID,
            puuid = players::UUID,
            suuid = servers::UUID,
            start = sessions::START,
            end = sessions::END,
            afk = sessions::AFK_TIME,
            deaths = sessions::DEATHS,
            mobs = sessions::MOB_KILLS,
            sessions = sessions::TABLE,
            players = players::TABLE,
            user = sessions::USER_ID,
            pid = players::ID,
            servers = servers::TABLE,
            server = sessions::SERVER_ID,
            sid = servers::ID,
            filter = filter,
        );
        let mut query = sqlx::query_as::<_, SessionEntity>(&session_sql).bind(to).bind(from);
        for bind in &filter_binds {
            query = query.bind(*bind);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::operation(operation, format!("[{from}, {to})"), e))?;

        let world_sql = format!(
            "SELECT wt.{session} AS session_id, w.{wname} AS world_name, \
                    wt.{survival} AS survival_time, wt.{creative} AS creative_time, \
                    wt.{adventure} AS adventure_time, wt.{spectator} AS spectator_time \
             FROM {world_times} wt \
             JOIN {worlds} w ON wt.{world} = w.{wid} \
             JOIN {sessions} s ON wt.{session} = s.{id} \
             WHERE {filter}",
            session = world_times::SESSION_ID,
            wname = worlds::NAME,
            survival = world_times::SURVIVAL,
            creative = world_times::CREATIVE,
            adventure = world_times::ADVENTURE,
            spectator = world_times::SPECTATOR,
            world_times = world_times::TABLE,
            worlds = worlds::TABLE,
            world = world_times::WORLD_ID,
            wid = worlds::ID,
            sessions = sessions::TABLE,
            id = sessions::ID,
            filter = filter,
        );
        let mut query = sqlx::query_as::<_, WorldTimeEntity>(&world_sql).bind(to).bind(from);
        for bind in &filter_binds {
            query = query.bind(*bind);
        }
        let world_rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::operation(operation, format!("[{from}, {to})"), e))?;

        let kill_sql = format!(
            "SELECT k.{session} AS session_id, k.{killer} AS killer_uuid, \
                    k.{victim} AS victim_uuid, k.{weapon} AS weapon, k.{date} AS date \
             FROM {kills} k \
             JOIN {sessions} s ON k.{session} = s.{id} \
             WHERE {filter}",
            session = kills::SESSION_ID,
            killer = kills::KILLER_UUID,
            victim = kills::VICTIM_UUID,
            weapon = kills::WEAPON,
            date = kills::DATE,
            kills = kills::TABLE,
            sessions = sessions::TABLE,
            id = sessions::ID,
            filter = filter,
        );
        let mut query = sqlx::query_as::<_, KillEntity>(&kill_sql).bind(to).bind(from);
        for bind in &filter_binds {
            query = query.bind(*bind);
        }
        let kill_rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::operation(operation, format!("[{from}, {to})"), e))?;

        timer.record();
        Self::assemble(rows, world_rows, kill_rows)
    }

    /// Stitches session rows with their owned world-time and kill rows.
    fn assemble(
        rows: Vec<SessionEntity>,
        world_rows: Vec<WorldTimeEntity>,
        kill_rows: Vec<KillEntity>,
    ) -> Result<Vec<Session>> {
        let mut worlds_by_session: HashMap<i64, Vec<WorldTimeEntity>> = HashMap::new();
        for wt in world_rows {
            worlds_by_session.entry(wt.session_id).or_default().push(wt);
        }
        let mut kills_by_session: HashMap<i64, Vec<KillEntity>> = HashMap::new();
        for kill in kill_rows {
            kills_by_session.entry(kill.session_id).or_default().push(kill);
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                row.into_domain(
                    worlds_by_session.remove(&id).unwrap_or_default(),
                    kills_by_session.remove(&id).unwrap_or_default(),
                )
            })
            .collect()
    }

    /// One page of all sessions ever recorded, ordered by row id. Used by
    /// the backup copy to bound memory on large scans.
    pub async fn fetch_sessions_page(&self, limit: i64, offset: i64) -> Result<Vec<Session>> {
        let operation = "fetch_sessions_page";
        let timer = QueryTimer::new(operation);

        let session_sql = format!(
            "SELECT s.{id} AS id, p.{puuid} AS player_uuid, sv.{suuid} AS server_uuid, \
                    s.{start} AS session_start, s.{end} AS session_end, \
                    s.{afk} AS afk_time, s.{deaths} AS deaths, s.{mobs} AS mob_kills \
             FROM {sessions} s \
             JOIN {players} p ON s.{user} = p.{pid} \
             JOIN {servers} sv ON s.{server} = sv.{sid} \
             ORDER BY s.{id} LIMIT ? OFFSET ?",
            id = sessions::ID,
            puuid = players::UUID,
            suuid = servers::UUID,
            start = sessions::START,
            end = sessions::END,
            afk = sessions::AFK_TIME,
            deaths = sessions::DEATHS,
            mobs = sessions::MOB_KILLS,
            sessions = sessions::TABLE,
            players = players::TABLE,
            user = sessions::USER_ID,
            pid = players::ID,
            servers = servers::TABLE,
            server = sessions::SERVER_ID,
            sid = servers::ID,
        );
        let rows = sqlx::query_as::<_, SessionEntity>(&session_sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::operation(operation, format!("offset {offset}"), e))?;

        if rows.is_empty() {
            timer.record();
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let id_list = vec!["?"; ids.len()].join(", ");

        let world_sql = format!(
            "SELECT wt.{session} AS session_id, w.{wname} AS world_name, \
                    wt.{survival} AS survival_time, wt.{creative} AS creative_time, \
                    wt.{adventure} AS adventure_time, wt.{spectator} AS spectator_time \
             FROM {world_times} wt \
             JOIN {worlds} w ON wt.{world} = w.{wid} \
             WHERE wt.{session} IN ({id_list})",
            session = world_times::SESSION_ID,
            wname = worlds::NAME,
            survival = world_times::SURVIVAL,
            creative = world_times::CREATIVE,
            adventure = world_times::ADVENTURE,
            spectator = world_times::SPECTATOR,
            world_times = world_times::TABLE,
            worlds = worlds::TABLE,
            world = world_times::WORLD_ID,
            wid = worlds::ID,
        );
        let mut query = sqlx::query_as::<_, WorldTimeEntity>(&world_sql);
        for id in &ids {
            query = query.bind(*id);
        }
        let world_rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::operation(operation, format!("offset {offset}"), e))?;

        let kill_sql = format!(
            "SELECT k.{session} AS session_id, k.{killer} AS killer_uuid, \
                    k.{victim} AS victim_uuid, k.{weapon} AS weapon, k.{date} AS date \
             FROM {kills} k WHERE k.{session} IN ({id_list})",
            session = kills::SESSION_ID,
            killer = kills::KILLER_UUID,
            victim = kills::VICTIM_UUID,
            weapon = kills::WEAPON,
            date = kills::DATE,
            kills = kills::TABLE,
        );
        let mut query = sqlx::query_as::<_, KillEntity>(&kill_sql);
        for id in &ids {
            query = query.bind(*id);
        }
        let kill_rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::operation(operation, format!("offset {offset}"), e))?;

        timer.record();
        Self::assemble(rows, world_rows, kill_rows)
    }
}
