//! Serialized, asynchronous transaction execution.

use std::sync::Arc;

use sqlx::AnyPool;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::db::Dialect;
use crate::error::{Result, StorageError};

use super::WriteTransaction;

/// Executes write transactions one at a time against a database instance.
///
/// Each transaction takes one pooled connection, applies its statements and
/// commits; any statement failure rolls the whole unit back before the error
/// is surfaced through the handle. The async mutex serializes the write path
/// only; queries keep using the rest of the pool concurrently.
#[derive(Clone)]
pub struct TransactionExecutor {
    pool: AnyPool,
    dialect: Dialect,
    write_lock: Arc<Mutex<()>>,
}

/// Completion handle of a submitted transaction.
///
/// Dropping the handle does not cancel the transaction; it runs to
/// completion either way. Waiting is an explicit act.
pub struct TransactionHandle {
    name: &'static str,
    inner: JoinHandle<Result<()>>,
}

impl TransactionHandle {
    /// Waits for commit or rollback and returns the outcome.
    pub async fn wait(self) -> Result<()> {
        self.inner
            .await
            .map_err(|_| StorageError::ExecutorShutDown)?
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl TransactionExecutor {
    pub fn new(pool: AnyPool, dialect: Dialect) -> Self {
        Self {
            pool,
            dialect,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Submits a transaction for execution off the caller's thread.
    ///
    /// Spawning here is direct; hosts that bound concurrent background work
    /// submit the `wait` of the returned handle through a
    /// [`shared::tasks::TaskPool`] with [`shared::tasks::Priority::Critical`],
    /// so writes queue instead of being shed under load.
    pub fn execute<T: WriteTransaction>(&self, mut transaction: T) -> TransactionHandle {
        let pool = self.pool.clone();
        let dialect = self.dialect;
        let lock = Arc::clone(&self.write_lock);
        let name = transaction.name();

        let inner = tokio::spawn(async move {
            let _guard = lock.lock().await;

            let mut tx = pool
                .begin()
                .await
                .map_err(|e| StorageError::operation(name, "acquiring connection", e))?;

            match transaction.apply(&mut tx, dialect).await {
                Ok(()) => {
                    tx.commit()
                        .await
                        .map_err(|e| StorageError::operation(name, "commit", e))?;
                    debug!(transaction = name, "Transaction committed");
                    Ok(())
                }
                Err(e) => {
                    // Rollback failure is secondary; dropping the sqlx
                    // transaction rolls back and releases the connection
                    // even if this explicit call fails.
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(
                            transaction = name,
                            error = %rollback_err,
                            "Rollback after failed transaction also failed"
                        );
                    }
                    warn!(transaction = name, error = %e, "Transaction rolled back");
                    Err(e)
                }
            }
        });

        TransactionHandle { name, inner }
    }
}
