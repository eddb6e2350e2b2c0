//! Storage error taxonomy.

use thiserror::Error;

/// Errors surfaced by the persistence layer.
///
/// `Schema` errors are never caught internally; they abort startup.
/// `Operation` errors roll the active transaction back and are returned to
/// the caller to decide on retry/notification. `DataInconsistency` marks an
/// integrity bug inside this crate and is logged at error severity before
/// the operation is aborted.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Schema migration failed at patch {patch}: {source}")]
    Schema {
        patch: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Storage operation '{operation}' failed: {source}")]
    Operation {
        operation: &'static str,
        /// Affected entity ids or other context for the log line.
        context: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Data inconsistency in '{operation}': {detail}")]
    DataInconsistency {
        operation: &'static str,
        detail: String,
    },

    #[error("Transaction executor is shut down")]
    ExecutorShutDown,
}

impl StorageError {
    pub fn operation(
        operation: &'static str,
        context: impl Into<String>,
        source: sqlx::Error,
    ) -> Self {
        Self::Operation {
            operation,
            context: context.into(),
            source,
        }
    }

    pub fn inconsistency(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::DataInconsistency {
            operation,
            detail: detail.into(),
        }
    }
}

/// Convenience alias used across queries and transactions.
pub type Result<T> = std::result::Result<T, StorageError>;
