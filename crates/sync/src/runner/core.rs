use std::sync::{Arc, Mutex, RwLock};

use atsched_core::{Clock, MonotonicClock, SchedulerConfig, TaskScheduler};

use crate::metrics::SchedulerMetrics;
use crate::queue::TaskQueue;
use crate::task::{lock, TaskHandle};

/// Time-ordered scheduler executing due tasks on whichever thread calls
/// `poll`.
///
/// Share it across threads behind an `Arc`. Any thread may schedule or
/// cancel; polling from several threads at once is safe, each due task is
/// still executed exactly once.
pub struct SyncScheduler<C: Clock = MonotonicClock> {
    pub(super) config: SchedulerConfig,
    pub(super) clock: C,
    /// Pending tasks ordered by due time.
    pub(super) queue: Mutex<TaskQueue<C::Instant>>,
    /// Scheduler metrics.
    pub(super) metrics: Arc<RwLock<SchedulerMetrics>>,
}

impl SyncScheduler<MonotonicClock> {
    /// Create a scheduler on the monotonic clock with default config.
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock)
    }
}

impl Default for SyncScheduler<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SyncScheduler<C> {
    pub fn with_clock(clock: C) -> Self {
        Self::with_config(SchedulerConfig::default(), clock)
    }

    pub fn with_config(config: SchedulerConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            queue: Mutex::new(TaskQueue::new()),
            metrics: Arc::new(RwLock::new(SchedulerMetrics::default())),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current instant according to the scheduler's clock.
    pub fn now(&self) -> C::Instant {
        self.clock.now()
    }

    /// Number of queued entries, including cancelled ones not yet popped.
    pub fn len(&self) -> usize {
        lock(&self.queue).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.queue).is_empty()
    }

    /// Earliest queued due time. Cancelled entries still count until a poll
    /// pops them, so this can be earlier than the next real execution.
    pub fn next_due(&self) -> Option<C::Instant> {
        lock(&self.queue).next_due()
    }

    /// Get a snapshot of the current scheduler metrics.
    pub fn metrics(&self) -> SchedulerMetrics {
        match self.metrics.read() {
            Ok(m) => m.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Get an Arc to the metrics (for external reads without cloning).
    pub fn metrics_handle(&self) -> Arc<RwLock<SchedulerMetrics>> {
        Arc::clone(&self.metrics)
    }

    pub(super) fn with_metrics<F>(&self, f: F)
    where
        F: FnOnce(&mut SchedulerMetrics),
    {
        match self.metrics.write() {
            Ok(mut m) => f(&mut m),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl<C: Clock> TaskScheduler for SyncScheduler<C> {
    type Instant = C::Instant;
    type Task<T, E> = TaskHandle<T, E, C::Instant>
    where
        T: Clone + Send + 'static,
        E: Clone + Send + 'static;

    fn poll(&self) {
        self.run_due();
    }

    fn schedule<F, T, E>(&self, at: C::Instant, call: F) -> TaskHandle<T, E, C::Instant>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        SyncScheduler::schedule(self, at, call)
    }

    fn cancel_all(&self) {
        SyncScheduler::cancel_all(self);
    }
}
