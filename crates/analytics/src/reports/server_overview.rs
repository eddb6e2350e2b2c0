//! Server overview report.

use domain::models::{Server, Trend};
use domain::services::TpsMutator;
use persistence::error::Result;
use persistence::queries::{
    session_queries::SessionScope, KillQueries, PlayerQueries, ServerQueries, SessionQueries,
    TpsQueries,
};
use serde::Serialize;
use shared::time::{now_ms, DAY_MS, MONTH_MS, WEEK_MS};
use sqlx::AnyPool;
use uuid::Uuid;

use crate::config::MetricsConfig;

use super::field;

/// Busiest recorded moment of a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeakPlayers {
    pub date: i64,
    pub players: i32,
}

/// Month/week snapshot of one server's population, playtime and performance.
///
/// Durations are milliseconds; `None` marks fields whose underlying query
/// failed when the report was built.
#[derive(Debug, Clone, Serialize)]
pub struct ServerOverview {
    pub server: Server,
    pub generated: i64,

    pub unique_players_month: Option<i64>,
    pub new_players_month: Option<i64>,
    pub retained_players_month: Option<i64>,
    pub playtime_month: Option<i64>,
    pub average_playtime_per_day: Option<i64>,
    pub session_count_month: Option<i64>,
    pub player_kill_count_month: Option<i64>,

    pub peak_players: Option<PeakPlayers>,
    pub all_time_peak_players: Option<PeakPlayers>,

    pub average_tps_week: Option<f64>,
    pub low_tps_spikes_week: Option<i64>,
    pub downtime_week: Option<i64>,

    pub unique_players_trend: Option<Trend>,
    pub new_players_trend: Option<Trend>,
    pub playtime_trend: Option<Trend>,
    pub session_count_trend: Option<Trend>,
    pub average_tps_trend: Option<Trend>,
    pub downtime_trend: Option<Trend>,
}

/// Builds [`ServerOverview`] reports from the storage layer.
pub struct ServerOverviewBuilder {
    servers: ServerQueries,
    players: PlayerQueries,
    sessions: SessionQueries,
    tps: TpsQueries,
    kills: KillQueries,
    metrics: MetricsConfig,
}

const REPORT: &str = "server_overview";

impl ServerOverviewBuilder {
    pub fn new(pool: AnyPool, metrics: MetricsConfig) -> Self {
        Self {
            servers: ServerQueries::new(pool.clone()),
            players: PlayerQueries::new(pool.clone()),
            sessions: SessionQueries::new(pool.clone()),
            tps: TpsQueries::new(pool.clone()),
            kills: KillQueries::new(pool),
            metrics,
        }
    }

    /// Builds the overview as of now. `Ok(None)` means the server is not
    /// registered; any other field failure degrades to `None` inside the
    /// report.
    pub async fn build(&self, server: Uuid) -> Result<Option<ServerOverview>> {
        self.build_at(server, now_ms()).await
    }

    /// Builds the overview as of `date`, for deterministic reports.
    pub async fn build_at(&self, server: Uuid, date: i64) -> Result<Option<ServerOverview>> {
        let Some(registered) = self.servers.fetch_server(server).await? else {
            return Ok(None);
        };

        let month_ago = date - MONTH_MS;
        let week_ago = date - WEEK_MS;
        let two_weeks_ago = date - 2 * WEEK_MS;
        let scope = SessionScope::server(server);

        let unique_players_month = field(
            REPORT,
            "unique_players_month",
            self.sessions.unique_player_count(month_ago, date, scope).await,
        );
        let new_players_month = field(
            REPORT,
            "new_players_month",
            self.players.new_player_count(month_ago, date, Some(server)).await,
        );
        let retained_players_month = field(
            REPORT,
            "retained_players_month",
            self.sessions
                .retained_player_count(month_ago, date, Some(server), self.metrics.retention_ms())
                .await,
        );
        let playtime_month = field(
            REPORT,
            "playtime_month",
            self.sessions.playtime(month_ago, date, scope).await,
        );
        let average_playtime_per_day = field(
            REPORT,
            "average_playtime_per_day",
            self.sessions
                .average_playtime_per_day(month_ago, date, scope)
                .await,
        );
        let session_count_month = field(
            REPORT,
            "session_count_month",
            self.sessions.session_count(month_ago, date, scope).await,
        );
        let player_kill_count_month = field(
            REPORT,
            "player_kill_count_month",
            self.kills.player_kill_count(month_ago, date, Some(server)).await,
        );

        let peak_players = field(
            REPORT,
            "peak_players",
            self.tps.peak_player_count(server, date - 2 * DAY_MS).await,
        )
        .flatten()
        .map(|(date, players)| PeakPlayers { date, players });
        let all_time_peak_players = field(
            REPORT,
            "all_time_peak_players",
            self.tps.all_time_peak_player_count(server).await,
        )
        .flatten()
        .map(|(date, players)| PeakPlayers { date, players });

        // One two-week fetch covers this week, last week and the trend.
        let tps_samples = field(
            REPORT,
            "tps_week",
            self.tps.fetch_tps(server, two_weeks_ago, date).await,
        );
        let (average_tps_week, low_tps_spikes_week, downtime_week, average_tps_trend, downtime_trend) =
            match &tps_samples {
                Some(samples) => {
                    let mutator = TpsMutator::new(samples);
                    let this_week = mutator.filter_by_range(week_ago, date);
                    let last_week = mutator.filter_by_range(two_weeks_ago, week_ago);
                    let interval = self.metrics.tps_max_interval_ms();

                    (
                        Some(this_week.average_tps()),
                        Some(this_week.low_tps_spike_count(self.metrics.low_tps_threshold) as i64),
                        Some(this_week.server_down_time(interval)),
                        Some(Trend::of_decimal(
                            last_week.average_tps(),
                            this_week.average_tps(),
                            false,
                        )),
                        Some(Trend::of_duration_ms(
                            last_week.server_down_time(interval),
                            this_week.server_down_time(interval),
                            true,
                        )),
                    )
                }
                None => (None, None, None, None, None),
            };

        let unique_players_trend = self
            .count_trend(
                "unique_players_trend",
                self.sessions
                    .unique_player_count(two_weeks_ago, week_ago, scope)
                    .await,
                self.sessions.unique_player_count(week_ago, date, scope).await,
            );
        let new_players_trend = self.count_trend(
            "new_players_trend",
            self.players
                .new_player_count(two_weeks_ago, week_ago, Some(server))
                .await,
            self.players.new_player_count(week_ago, date, Some(server)).await,
        );
        let session_count_trend = self.count_trend(
            "session_count_trend",
            self.sessions.session_count(two_weeks_ago, week_ago, scope).await,
            self.sessions.session_count(week_ago, date, scope).await,
        );
        let playtime_trend = match (
            field(
                REPORT,
                "playtime_trend",
                self.sessions.playtime(two_weeks_ago, week_ago, scope).await,
            ),
            field(
                REPORT,
                "playtime_trend",
                self.sessions.playtime(week_ago, date, scope).await,
            ),
        ) {
            (Some(before), Some(after)) => Some(Trend::of_duration_ms(before, after, false)),
            _ => None,
        };

        Ok(Some(ServerOverview {
            server: registered,
            generated: date,
            unique_players_month,
            new_players_month,
            retained_players_month,
            playtime_month,
            average_playtime_per_day,
            session_count_month,
            player_kill_count_month,
            peak_players,
            all_time_peak_players,
            average_tps_week,
            low_tps_spikes_week,
            downtime_week,
            unique_players_trend,
            new_players_trend,
            playtime_trend,
            session_count_trend,
            average_tps_trend,
            downtime_trend,
        }))
    }

    fn count_trend(
        &self,
        name: &'static str,
        before: Result<i64>,
        after: Result<i64>,
    ) -> Option<Trend> {
        match (field(REPORT, name, before), field(REPORT, name, after)) {
            (Some(before), Some(after)) => Some(Trend::of_count(before, after, false)),
            _ => None,
        }
    }
}
