use std::sync::Arc;
use std::time::Duration;

use atsched_core::Clock;
use tracing::{debug, info};

use crate::task::{lock, Runnable, SyncTask, TaskHandle};

use super::SyncScheduler;

impl<C: Clock> SyncScheduler<C> {
    /// Register `call` to run no earlier than `at`.
    ///
    /// Never runs the call here, even when `at` is already in the past; the
    /// next `poll` picks it up.
    pub fn schedule<F, T, E>(&self, at: C::Instant, call: F) -> TaskHandle<T, E, C::Instant>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        self.enqueue(at, None, call)
    }

    /// As [`schedule`](Self::schedule), with a label carried into logs.
    pub fn schedule_named<F, T, E>(
        &self,
        at: C::Instant,
        label: impl Into<String>,
        call: F,
    ) -> TaskHandle<T, E, C::Instant>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        self.enqueue(at, Some(label.into()), call)
    }

    /// Register `call` to run `delay` from now.
    pub fn schedule_after<F, T, E>(&self, delay: Duration, call: F) -> TaskHandle<T, E, C::Instant>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        let at = self.clock.after(delay);
        self.enqueue(at, None, call)
    }

    fn enqueue<F, T, E>(
        &self,
        at: C::Instant,
        label: Option<String>,
        call: F,
    ) -> TaskHandle<T, E, C::Instant>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let task = Arc::new(SyncTask::new(at, label, Box::new(call)));
        debug!(
            task_id = %task.id(),
            label = task.label().unwrap_or("-"),
            due = ?at,
            "scheduled task"
        );

        let queued: Arc<dyn Runnable> = task.clone();
        lock(&self.queue).push(at, queued);
        self.with_metrics(|m| m.tasks_scheduled += 1);

        TaskHandle::new(task)
    }

    /// Cancel every queued task and return how many were still pending.
    ///
    /// The queue is swapped for an empty one under the lock; the tasks are
    /// cancelled afterwards with no lock held. Tasks scheduled while the
    /// sweep runs are not affected.
    pub fn cancel_all(&self) -> usize {
        let pending = lock(&self.queue).take_all();
        let total = pending.len();

        let mut cancelled = 0;
        for entry in pending {
            if entry.task.cancel() {
                cancelled += 1;
            }
        }

        info!(cancelled, dropped = total, "cancelled all pending tasks");
        self.with_metrics(|m| m.tasks_bulk_cancelled += cancelled as u64);
        cancelled
    }
}
