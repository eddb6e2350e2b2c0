//! Player overview report.

use domain::models::{ActivityGroup, Player, Trend, WorldTimes};
use domain::services::{activity_index, kdr, PingMutator, SessionsMutator};
use persistence::error::Result;
use persistence::queries::{
    session_queries::SessionScope, KillQueries, PingQueries, PlayerQueries, SessionQueries,
};
use serde::Serialize;
use shared::time::{now_ms, MONTH_MS, WEEK_MS};
use sqlx::AnyPool;
use uuid::Uuid;

use crate::config::MetricsConfig;

use super::field;

/// Month snapshot of one player's activity, combat and connection quality.
///
/// Durations are milliseconds; `None` marks fields whose underlying query
/// failed when the report was built.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerOverview {
    pub player: Player,
    pub generated: i64,

    pub activity_score: Option<f64>,
    pub activity_group: Option<ActivityGroup>,

    pub playtime_month: Option<i64>,
    pub active_playtime_month: Option<i64>,
    pub afk_time_month: Option<i64>,
    pub session_count_month: Option<i64>,
    pub average_session_length: Option<i64>,
    pub median_session_length: Option<f64>,
    pub longest_session: Option<i64>,
    pub last_seen: Option<i64>,
    pub world_times: Option<WorldTimes>,

    pub player_kills_month: Option<i64>,
    pub mob_kills_month: Option<i64>,
    pub deaths_month: Option<i64>,
    pub kdr: Option<f64>,

    pub average_ping: Option<f64>,
    pub best_ping: Option<i32>,
    pub worst_ping: Option<i32>,

    pub playtime_trend: Option<Trend>,
    pub session_count_trend: Option<Trend>,
}

/// Builds [`PlayerOverview`] reports from the storage layer.
pub struct PlayerOverviewBuilder {
    players: PlayerQueries,
    sessions: SessionQueries,
    pings: PingQueries,
    kills: KillQueries,
    metrics: MetricsConfig,
}

const REPORT: &str = "player_overview";

impl PlayerOverviewBuilder {
    pub fn new(pool: AnyPool, metrics: MetricsConfig) -> Self {
        Self {
            players: PlayerQueries::new(pool.clone()),
            sessions: SessionQueries::new(pool.clone()),
            pings: PingQueries::new(pool.clone()),
            kills: KillQueries::new(pool),
            metrics,
        }
    }

    /// Builds the overview as of now. `Ok(None)` means the player is not
    /// registered; any other field failure degrades to `None` inside the
    /// report.
    pub async fn build(&self, player: Uuid) -> Result<Option<PlayerOverview>> {
        self.build_at(player, now_ms()).await
    }

    /// Builds the overview as of `date`, for deterministic reports.
    pub async fn build_at(&self, player: Uuid, date: i64) -> Result<Option<PlayerOverview>> {
        let Some(registered) = self.players.fetch_player(player).await? else {
            return Ok(None);
        };

        let month_ago = date - MONTH_MS;
        let week_ago = date - WEEK_MS;
        let two_weeks_ago = date - 2 * WEEK_MS;
        let scope = SessionScope::player(player);

        // One month of sessions feeds every session-derived field, including
        // the three-week activity index window.
        let sessions = field(
            REPORT,
            "sessions_month",
            self.sessions.fetch_sessions(month_ago, date, scope).await,
        );

        let session_fields = sessions.as_deref().map(|sessions| {
            let mutator = SessionsMutator::new(sessions);
            let index =
                activity_index(sessions, date, self.metrics.active_playtime_threshold_ms());
            let this_week = mutator.filter_by_range(week_ago, date);
            let last_week = mutator.filter_by_range(two_weeks_ago, week_ago);

            SessionFields {
                activity_score: index.score,
                activity_group: index.group(),
                playtime: mutator.playtime_in(month_ago, date),
                active_playtime: mutator.active_playtime(),
                afk_time: mutator.afk_time(),
                session_count: mutator.count() as i64,
                average_length: mutator.average_length(),
                median_length: mutator.median_length(),
                longest: mutator.longest(),
                last_seen: mutator.latest_start(),
                world_times: mutator.world_times(),
                deaths: mutator.death_count(),
                mob_kills: mutator.mob_kill_count(),
                playtime_trend: Trend::of_duration_ms(
                    last_week.playtime_in(two_weeks_ago, week_ago),
                    this_week.playtime_in(week_ago, date),
                    false,
                ),
                session_count_trend: Trend::of_count(
                    last_week.count() as i64,
                    this_week.count() as i64,
                    false,
                ),
            }
        });

        let player_kills_month = field(
            REPORT,
            "player_kills_month",
            self.kills.kills_by_player(player, month_ago, date).await,
        );
        let kdr = match (&player_kills_month, &session_fields) {
            (Some(kills), Some(fields)) => Some(kdr(*kills, fields.deaths)),
            _ => None,
        };

        let pings = field(
            REPORT,
            "pings_month",
            self.pings.fetch_player_pings(player, month_ago, date).await,
        );
        let (average_ping, best_ping, worst_ping) = match &pings {
            Some(samples) => {
                let mutator = PingMutator::new(samples);
                (Some(mutator.average()), Some(mutator.min()), Some(mutator.max()))
            }
            None => (None, None, None),
        };

        Ok(Some(PlayerOverview {
            player: registered,
            generated: date,
            activity_score: session_fields.as_ref().map(|f| f.activity_score),
            activity_group: session_fields.as_ref().map(|f| f.activity_group),
            playtime_month: session_fields.as_ref().map(|f| f.playtime),
            active_playtime_month: session_fields.as_ref().map(|f| f.active_playtime),
            afk_time_month: session_fields.as_ref().map(|f| f.afk_time),
            session_count_month: session_fields.as_ref().map(|f| f.session_count),
            average_session_length: session_fields.as_ref().map(|f| f.average_length),
            median_session_length: session_fields.as_ref().map(|f| f.median_length),
            longest_session: session_fields.as_ref().map(|f| f.longest),
            last_seen: session_fields.as_ref().and_then(|f| f.last_seen),
            world_times: session_fields.as_ref().map(|f| f.world_times.clone()),
            player_kills_month,
            mob_kills_month: session_fields.as_ref().map(|f| f.mob_kills),
            deaths_month: session_fields.as_ref().map(|f| f.deaths),
            kdr,
            average_ping,
            best_ping,
            worst_ping,
            playtime_trend: session_fields.as_ref().map(|f| f.playtime_trend.clone()),
            session_count_trend: session_fields.as_ref().map(|f| f.session_count_trend.clone()),
        }))
    }
}

struct SessionFields {
    activity_score: f64,
    activity_group: ActivityGroup,
    playtime: i64,
    active_playtime: i64,
    afk_time: i64,
    session_count: i64,
    average_length: i64,
    median_length: f64,
    longest: i64,
    last_seen: Option<i64>,
    world_times: WorldTimes,
    deaths: i64,
    mob_kills: i64,
    playtime_trend: Trend,
    session_count_trend: Trend,
}
