//! Bounded background task pool with two priority classes.
//!
//! Storage writes and report builds both run off the caller's thread. The
//! pool distinguishes two classes of work:
//! - [`Priority::Critical`] tasks must eventually run (writes affecting data
//!   integrity); submission waits for a slot.
//! - [`Priority::BestEffort`] tasks are rejected when the pool is saturated
//!   (report builds, cache warmups).

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Priority class of a submitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Must eventually run; submission waits for capacity.
    Critical,
    /// May be rejected under load.
    BestEffort,
}

/// Error type for task submission.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task pool saturated, best-effort task rejected")]
    Saturated,
    #[error("Task pool is shut down")]
    ShutDown,
}

/// Handle to a submitted task.
///
/// Dropping the handle detaches the task; it still runs to completion.
/// In-flight work is never cancelled preemptively.
pub struct TaskHandle<T> {
    inner: JoinHandle<T>,
}

impl<T> TaskHandle<T> {
    /// Waits for the task to finish and returns its output.
    ///
    /// Blocking on completion is an explicit act, never implicit.
    pub async fn wait(self) -> Result<T, TaskError> {
        self.inner.await.map_err(|_| TaskError::ShutDown)
    }
}

/// Bounded pool executing async tasks on the tokio runtime.
#[derive(Clone)]
pub struct TaskPool {
    permits: Arc<Semaphore>,
}

impl TaskPool {
    /// Creates a pool allowing at most `capacity` concurrently running tasks.
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
        }
    }

    /// Submits a task with the given priority.
    ///
    /// Critical submissions wait for a free slot; best-effort submissions
    /// fail fast with [`TaskError::Saturated`] when none is available.
    pub async fn submit<F, T>(&self, priority: Priority, task: F) -> Result<TaskHandle<T>, TaskError>
    where
        F: std::future::Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let permit = match priority {
            Priority::Critical => permits
                .acquire_owned()
                .await
                .map_err(|_| TaskError::ShutDown)?,
            Priority::BestEffort => permits
                .try_acquire_owned()
                .map_err(|_| TaskError::Saturated)?,
        };

        let inner = tokio::spawn(async move {
            let out = task.await;
            drop(permit);
            out
        });
        Ok(TaskHandle { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn runs_submitted_task() {
        let pool = TaskPool::new(2);
        let handle = pool
            .submit(Priority::Critical, async { 21 * 2 })
            .await
            .unwrap();
        assert_eq!(handle.wait().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn best_effort_rejected_when_saturated() {
        let pool = TaskPool::new(1);
        let blocker = pool
            .submit(Priority::Critical, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
            })
            .await
            .unwrap();

        let rejected = pool.submit(Priority::BestEffort, async {}).await;
        assert!(matches!(rejected, Err(TaskError::Saturated)));
        drop(blocker);
    }

    #[tokio::test]
    async fn critical_waits_for_capacity() {
        let pool = TaskPool::new(1);
        let first = pool
            .submit(Priority::Critical, async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                1
            })
            .await
            .unwrap();

        // Second critical task queues behind the first instead of failing.
        let second = pool.submit(Priority::Critical, async { 2 }).await.unwrap();
        assert_eq!(first.wait().await.unwrap(), 1);
        assert_eq!(second.wait().await.unwrap(), 2);
    }
}
