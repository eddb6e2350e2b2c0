//! Versioned, idempotent schema migration.
//!
//! The migrator holds an ordered patch list. Each patch probes whether its
//! change is already present before applying, so the full sequence can be
//! re-run against an already-patched database without effect. Versions are
//! recorded in `schema_versions`; a failing patch aborts startup with a
//! [`StorageError::Schema`] naming the patch, and is never retried.

use async_trait::async_trait;
use sqlx::{AnyPool, Row};
use tracing::{debug, info};

use crate::db::Dialect;
use crate::error::{Result, StorageError};
use crate::schema::tables::{self, schema_versions};
use crate::transactions::AnyTx;

/// One versioned schema change.
#[async_trait]
pub trait Patch: Send + Sync {
    /// Monotonically increasing version, unique across the patch list.
    fn version(&self) -> u32;
    fn name(&self) -> &'static str;

    /// True when the change is already present in the schema. Probed before
    /// `apply`, which makes the patch itself idempotent even when the
    /// version row is missing (e.g. a database created by an older build).
    async fn applied(&self, tx: &mut AnyTx<'_>, dialect: Dialect) -> std::result::Result<bool, sqlx::Error>;

    async fn apply(&self, tx: &mut AnyTx<'_>, dialect: Dialect) -> std::result::Result<(), sqlx::Error>;
}

/// True when `table.column` exists, probed through schema metadata.
pub async fn column_exists(
    tx: &mut AnyTx<'_>,
    dialect: Dialect,
    table: &str,
    column: &str,
) -> std::result::Result<bool, sqlx::Error> {
    let count: i64 = match dialect {
        Dialect::MySql => {
            sqlx::query(
                "SELECT COUNT(*) FROM information_schema.COLUMNS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_NAME = ?",
            )
            .bind(table)
            .bind(column)
            .fetch_one(&mut **tx)
            .await?
            .try_get(0)?
        }
        Dialect::Sqlite => sqlx::query("SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?")
            .bind(table)
            .bind(column)
            .fetch_one(&mut **tx)
            .await?
            .try_get(0)?,
    };
    Ok(count > 0)
}

/// True when `table` exists.
pub async fn table_exists(
    tx: &mut AnyTx<'_>,
    dialect: Dialect,
    table: &str,
) -> std::result::Result<bool, sqlx::Error> {
    let count: i64 = match dialect {
        Dialect::MySql => {
            sqlx::query(
                "SELECT COUNT(*) FROM information_schema.TABLES \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
            )
            .bind(table)
            .fetch_one(&mut **tx)
            .await?
            .try_get(0)?
        }
        Dialect::Sqlite => {
            sqlx::query("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table)
                .fetch_one(&mut **tx)
                .await?
                .try_get(0)?
        }
    };
    Ok(count > 0)
}

/// Creates every table of the current schema. Version 1.
struct CreateTablesPatch;

#[async_trait]
impl Patch for CreateTablesPatch {
    fn version(&self) -> u32 {
        1
    }

    fn name(&self) -> &'static str {
        "create_tables"
    }

    async fn applied(&self, _tx: &mut AnyTx<'_>, _dialect: Dialect) -> std::result::Result<bool, sqlx::Error> {
        // CREATE TABLE IF NOT EXISTS is idempotent on its own, and probing
        // every table would duplicate it. Always run.
        Ok(false)
    }

    async fn apply(&self, tx: &mut AnyTx<'_>, dialect: Dialect) -> std::result::Result<(), sqlx::Error> {
        for table in tables::all_tables() {
            sqlx::query(&table.create_sql(dialect))
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}

/// Adds a column to an existing table when missing.
///
/// Databases created after the column joined the base schema probe as
/// already applied; older ones get the ALTER.
struct AddColumnPatch {
    version: u32,
    name: &'static str,
    table: &'static str,
    column: &'static str,
    /// Full column definition following the name, e.g. `BIGINT NOT NULL DEFAULT -1`.
    definition: &'static str,
}

#[async_trait]
impl Patch for AddColumnPatch {
    fn version(&self) -> u32 {
        self.version
    }

    fn name(&self) -> &'static str {
        self.name
    }

    async fn applied(&self, tx: &mut AnyTx<'_>, dialect: Dialect) -> std::result::Result<bool, sqlx::Error> {
        column_exists(tx, dialect, self.table, self.column).await
    }

    async fn apply(&self, tx: &mut AnyTx<'_>, _dialect: Dialect) -> std::result::Result<(), sqlx::Error> {
        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            self.table, self.column, self.definition
        );
        sqlx::query(&sql).execute(&mut **tx).await?;
        Ok(())
    }
}

/// The full patch history in version order.
///
/// New schema changes append here; versions are never reused or reordered.
fn patches() -> Vec<Box<dyn Patch>> {
    vec![
        Box::new(CreateTablesPatch),
        Box::new(AddColumnPatch {
            version: 2,
            name: "sessions_afk_time",
            table: tables::sessions::TABLE,
            column: tables::sessions::AFK_TIME,
            definition: "BIGINT NOT NULL DEFAULT 0",
        }),
        Box::new(AddColumnPatch {
            version: 3,
            name: "tps_free_disk_space",
            table: tables::tps::TABLE,
            column: tables::tps::FREE_DISK,
            definition: "BIGINT NOT NULL DEFAULT -1",
        }),
        Box::new(AddColumnPatch {
            version: 4,
            name: "ping_min_max",
            table: tables::ping::TABLE,
            column: tables::ping::MAX_PING,
            definition: "INT NOT NULL DEFAULT -1",
        }),
        Box::new(AddColumnPatch {
            version: 5,
            name: "servers_is_proxy",
            table: tables::servers::TABLE,
            column: tables::servers::IS_PROXY,
            definition: "BOOLEAN NOT NULL DEFAULT 0",
        }),
    ]
}

fn fatal(patch_name: &str, version: u32, e: sqlx::Error) -> StorageError {
    StorageError::Schema {
        patch: format!("{patch_name} (v{version})"),
        source: e,
    }
}

/// Applies all pending patches in ascending version order.
///
/// Fatal on failure; callers must not start serving storage operations when
/// this returns an error.
pub async fn migrate(pool: &AnyPool, dialect: Dialect) -> Result<()> {
    let version_table = tables::schema_versions_table();
    sqlx::query(&version_table.create_sql(dialect))
        .execute(pool)
        .await
        .map_err(|e| StorageError::Schema {
            patch: "schema_versions".to_string(),
            source: e,
        })?;

    let recorded: Vec<i64> = sqlx::query(&format!(
        "SELECT {} FROM {}",
        schema_versions::VERSION,
        schema_versions::TABLE
    ))
    .fetch_all(pool)
    .await
    .map_err(|e| StorageError::Schema {
        patch: "schema_versions".to_string(),
        source: e,
    })?
    .iter()
    .filter_map(|row| row.try_get::<i64, _>(0).ok())
    .collect();

    let mut all = patches();
    all.sort_by_key(|p| p.version());

    for patch in all {
        let version = patch.version();
        if recorded.contains(&(version as i64)) {
            debug!(patch = patch.name(), version, "Patch already recorded, skipping");
            continue;
        }

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| fatal(patch.name(), version, e))?;

        if !patch
            .applied(&mut tx, dialect)
            .await
            .map_err(|e| fatal(patch.name(), version, e))?
        {
            info!(patch = patch.name(), version, "Applying schema patch");
            patch
                .apply(&mut tx, dialect)
                .await
                .map_err(|e| fatal(patch.name(), version, e))?;
        } else {
            debug!(patch = patch.name(), version, "Schema change already present");
        }

        sqlx::query(&format!(
            "INSERT INTO {} ({}, {}, {}) VALUES (?, ?, ?)",
            schema_versions::TABLE,
            schema_versions::VERSION,
            schema_versions::NAME,
            schema_versions::APPLIED
        ))
        .bind(version as i64)
        .bind(patch.name())
        .bind(shared::time::now_ms())
        .execute(&mut *tx)
        .await
        .map_err(|e| fatal(patch.name(), version, e))?;

        tx.commit()
            .await
            .map_err(|e| fatal(patch.name(), version, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_versions_are_strictly_ascending_and_unique() {
        let all = patches();
        let mut last = 0;
        for patch in &all {
            assert!(
                patch.version() > last,
                "patch {} breaks version ordering",
                patch.name()
            );
            last = patch.version();
        }
    }
}
