//! End-to-end storage tests against an in-memory SQLite database.
//!
//! The pool is capped at a single connection: every connection to
//! `sqlite::memory:` opens its own database, so one shared connection is the
//! only way migration and queries see the same data.

use async_trait::async_trait;
use domain::models::{GameMode, Player, Server, Session, UserInfo, WorldTimes};
use persistence::db::{create_pool, DatabaseConfig, Dialect};
use persistence::error::StorageError;
use persistence::migrations;
use persistence::queries::{
    session_queries::SessionScope, PlayerQueries, ServerQueries, SessionQueries,
};
use persistence::transactions::{
    AnyTx, RegisterPlayerTransaction, RegisterUserInfoTransaction, RemovePlayerTransaction,
    StoreServerTransaction, StoreSessionTransaction, TransactionExecutor, WriteTransaction,
};
use shared::tasks::{Priority, TaskPool};
use sqlx::AnyPool;
use uuid::Uuid;

async fn memory_pool() -> AnyPool {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        connect_timeout_secs: 5,
        idle_timeout_secs: 600,
    };
    let pool = create_pool(&config).await.expect("pool");
    migrations::migrate(&pool, Dialect::Sqlite).await.expect("migration");
    pool
}

async fn register(executor: &TransactionExecutor, server: &Server, player: &Player) {
    executor
        .execute(StoreServerTransaction {
            server: server.clone(),
        })
        .wait()
        .await
        .expect("store server");
    executor
        .execute(RegisterPlayerTransaction {
            player: player.clone(),
        })
        .wait()
        .await
        .expect("register player");
    executor
        .execute(RegisterUserInfoTransaction {
            user_info: UserInfo {
                player: player.uuid,
                server: server.uuid,
                registered: player.registered,
                operator: false,
                banned: false,
            },
        })
        .wait()
        .await
        .expect("register user info");
}

fn session(player: Uuid, server: Uuid, start: i64, end: i64) -> Session {
    Session {
        player,
        server,
        start,
        end,
        afk_ms: 0,
        deaths: 0,
        mob_kills: 0,
        world_times: WorldTimes::new(),
        player_kills: Vec::new(),
    }
}

#[tokio::test]
async fn migration_is_idempotent() {
    let pool = memory_pool().await;
    // Second full run over an already migrated database is a no-op.
    migrations::migrate(&pool, Dialect::Sqlite)
        .await
        .expect("second migration run");
}

#[tokio::test]
async fn session_round_trip() {
    let pool = memory_pool().await;
    let executor = TransactionExecutor::new(pool.clone(), Dialect::Sqlite);

    let server = Server::new(Uuid::new_v4(), "Survival");
    let player = Player {
        uuid: Uuid::new_v4(),
        name: "Steve".to_string(),
        registered: 500,
    };
    register(&executor, &server, &player).await;

    let mut stored = session(player.uuid, server.uuid, 1_000, 5_000);
    stored.afk_ms = 250;
    stored.deaths = 3;
    stored.mob_kills = 7;
    stored.world_times.add("overworld", GameMode::Survival, 3_000);
    stored.world_times.add("nether", GameMode::Adventure, 1_000);

    executor
        .execute(StoreSessionTransaction {
            session: stored.clone(),
        })
        .wait()
        .await
        .expect("store session");

    let fetched = SessionQueries::new(pool)
        .fetch_sessions(0, 10_000, SessionScope::player(player.uuid))
        .await
        .expect("fetch sessions");

    assert_eq!(fetched.len(), 1);
    let found = &fetched[0];
    assert_eq!(found.start, stored.start);
    assert_eq!(found.end, stored.end);
    assert_eq!(found.afk_ms, stored.afk_ms);
    assert_eq!(found.deaths, stored.deaths);
    assert_eq!(found.mob_kills, stored.mob_kills);
    assert_eq!(
        found.world_times.world("overworld").map(|t| t.survival),
        Some(3_000)
    );
    assert_eq!(
        found.world_times.world("nether").map(|t| t.adventure),
        Some(1_000)
    );
}

#[tokio::test]
async fn failed_transaction_leaves_no_partial_rows() {
    let pool = memory_pool().await;
    let executor = TransactionExecutor::new(pool.clone(), Dialect::Sqlite);

    let server = Server::new(Uuid::new_v4(), "Survival");
    executor
        .execute(StoreServerTransaction {
            server: server.clone(),
        })
        .wait()
        .await
        .expect("store server");

    // Player is never registered, so the session insert cannot resolve its
    // user id; the whole transaction must roll back.
    let orphan = Uuid::new_v4();
    let result = executor
        .execute(StoreSessionTransaction {
            session: session(orphan, server.uuid, 1_000, 2_000),
        })
        .wait()
        .await;
    assert!(matches!(
        result,
        Err(StorageError::DataInconsistency { .. })
    ));

    let sessions = SessionQueries::new(pool)
        .fetch_sessions(0, 10_000, SessionScope::server(server.uuid))
        .await
        .expect("fetch sessions");
    assert!(sessions.is_empty());
}

/// Applies a full server insert, then fails on a later statement.
struct InterruptedRegistration {
    server: Server,
}

#[async_trait]
impl WriteTransaction for InterruptedRegistration {
    fn name(&self) -> &'static str {
        "interrupted_registration"
    }

    async fn apply(
        &mut self,
        tx: &mut AnyTx<'_>,
        dialect: Dialect,
    ) -> persistence::error::Result<()> {
        StoreServerTransaction {
            server: self.server.clone(),
        }
        .apply(tx, dialect)
        .await?;
        Err(StorageError::inconsistency(
            "interrupted_registration",
            "deliberate failure after the server insert",
        ))
    }
}

#[tokio::test]
async fn rollback_undoes_statements_applied_before_the_failure() {
    let pool = memory_pool().await;
    let executor = TransactionExecutor::new(pool.clone(), Dialect::Sqlite);

    let server = Server::new(Uuid::new_v4(), "Survival");
    let result = executor
        .execute(InterruptedRegistration {
            server: server.clone(),
        })
        .wait()
        .await;
    assert!(matches!(
        result,
        Err(StorageError::DataInconsistency { .. })
    ));

    // The server insert succeeded inside the transaction; rollback must
    // leave it invisible.
    let found = ServerQueries::new(pool)
        .fetch_server(server.uuid)
        .await
        .expect("fetch server");
    assert!(found.is_none());
}

#[tokio::test]
async fn inverted_session_is_rejected() {
    let pool = memory_pool().await;
    let executor = TransactionExecutor::new(pool.clone(), Dialect::Sqlite);

    let server = Server::new(Uuid::new_v4(), "Survival");
    let player = Player {
        uuid: Uuid::new_v4(),
        name: "Steve".to_string(),
        registered: 0,
    };
    register(&executor, &server, &player).await;

    let result = executor
        .execute(StoreSessionTransaction {
            session: session(player.uuid, server.uuid, 5_000, 1_000),
        })
        .wait()
        .await;
    assert!(matches!(
        result,
        Err(StorageError::DataInconsistency { .. })
    ));
}

#[tokio::test]
async fn writes_route_through_the_task_pool() {
    let pool = memory_pool().await;
    let executor = TransactionExecutor::new(pool.clone(), Dialect::Sqlite);
    let tasks = TaskPool::new(1);

    let server = Server::new(Uuid::new_v4(), "Survival");
    let submitted = {
        let executor = executor.clone();
        let server = server.clone();
        tasks
            .submit(Priority::Critical, async move {
                executor
                    .execute(StoreServerTransaction { server })
                    .wait()
                    .await
            })
            .await
            .expect("submit")
    };
    submitted.wait().await.expect("task pool").expect("store server");

    let found = ServerQueries::new(pool)
        .fetch_server(server.uuid)
        .await
        .expect("fetch server");
    assert!(found.is_some());
}

#[tokio::test]
async fn playtime_is_additive_across_a_split() {
    let pool = memory_pool().await;
    let executor = TransactionExecutor::new(pool.clone(), Dialect::Sqlite);

    let server = Server::new(Uuid::new_v4(), "Survival");
    let player = Player {
        uuid: Uuid::new_v4(),
        name: "Steve".to_string(),
        registered: 0,
    };
    register(&executor, &server, &player).await;

    for (start, end) in [(1_000, 5_000), (6_000, 9_000), (2_000, 8_000)] {
        executor
            .execute(StoreSessionTransaction {
                session: session(player.uuid, server.uuid, start, end),
            })
            .wait()
            .await
            .expect("store session");
    }

    let queries = SessionQueries::new(pool);
    let scope = SessionScope::server(server.uuid);
    let (from, mid, to) = (0, 4_500, 10_000);
    let first = queries.playtime(from, mid, scope).await.expect("playtime");
    let second = queries.playtime(mid, to, scope).await.expect("playtime");
    let whole = queries.playtime(from, to, scope).await.expect("playtime");
    assert_eq!(first + second, whole);
}

#[tokio::test]
async fn alpha_bob_scenario() {
    let pool = memory_pool().await;
    let executor = TransactionExecutor::new(pool.clone(), Dialect::Sqlite);

    let alpha = Server::new(Uuid::new_v4(), "Alpha");
    let bob = Player {
        uuid: Uuid::new_v4(),
        name: "Bob".to_string(),
        registered: 900,
    };
    register(&executor, &alpha, &bob).await;

    let mut bobs_session = session(bob.uuid, alpha.uuid, 1_000, 5_000);
    bobs_session.afk_ms = 500;
    bobs_session.deaths = 1;
    bobs_session.mob_kills = 2;
    executor
        .execute(StoreSessionTransaction {
            session: bobs_session,
        })
        .wait()
        .await
        .expect("store session");

    let sessions = SessionQueries::new(pool.clone());
    let scope = SessionScope::server(alpha.uuid);
    assert_eq!(sessions.playtime(0, 10_000, scope).await.expect("playtime"), 4_000);
    assert_eq!(
        sessions.death_count(0, 10_000, scope).await.expect("deaths"),
        1
    );

    executor
        .execute(RemovePlayerTransaction { player: bob.uuid })
        .wait()
        .await
        .expect("remove player");

    let players = PlayerQueries::new(pool);
    assert!(players.fetch_player(bob.uuid).await.expect("fetch player").is_none());
    assert!(sessions
        .fetch_sessions(0, 10_000, SessionScope::player(bob.uuid))
        .await
        .expect("fetch sessions")
        .is_empty());
    assert_eq!(sessions.playtime(0, 10_000, scope).await.expect("playtime"), 0);
}
