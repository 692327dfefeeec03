use std::time::Instant;

use atsched_core::Clock;
use tracing::{debug, warn};

use crate::queue::QueueEntry;
use crate::task::lock;
use crate::types::{PollReport, RunStatus};

use super::SyncScheduler;

impl<C: Clock> SyncScheduler<C> {
    /// Execute every task that is due right now, in due-time order, and
    /// return what happened.
    ///
    /// The clock is re-read before each pop, so tasks that become due while
    /// earlier calls are running are picked up in the same pass. Failures and
    /// panics are stored on the task; they never escape this method.
    pub fn run_due(&self) -> PollReport {
        let mut report = PollReport::default();

        while let Some(entry) = self.pop_due() {
            if entry.task.is_cancelled() {
                debug!(task_id = %entry.task.id(), "discarding cancelled task");
                report.record(RunStatus::Skipped);
                continue;
            }
            let status = self.exec_task(&entry);
            report.record(status);
        }

        self.with_metrics(|m| m.record_poll(&report));
        report
    }

    /// Extract the earliest entry if it is due. Extraction happens under the
    /// queue lock, so concurrent pollers never get the same entry.
    fn pop_due(&self) -> Option<QueueEntry<C::Instant>> {
        let mut queue = lock(&self.queue);
        let now = self.clock.now();
        queue.pop_due(now)
    }

    fn exec_task(&self, entry: &QueueEntry<C::Instant>) -> RunStatus {
        let task = &entry.task;
        let label = task.label().unwrap_or("-");
        debug!(task_id = %task.id(), label, due = ?entry.due, "executing task");

        let started = Instant::now();
        let status = task.run();
        let elapsed = started.elapsed();

        match status {
            RunStatus::Completed => {
                debug!(task_id = %task.id(), label, ?elapsed, "task completed");
            }
            RunStatus::Failed => {
                warn!(task_id = %task.id(), label, ?elapsed, "task failed; error stored on task");
            }
            RunStatus::Panicked => {
                warn!(task_id = %task.id(), label, ?elapsed, "task panicked; panic stored on task");
            }
            // Cancelled between the check and the run.
            RunStatus::Skipped => return status,
        }

        let slow = elapsed > self.config.slow_task_threshold();
        if slow {
            warn!(
                task_id = %task.id(),
                label,
                ?elapsed,
                threshold_ms = self.config.slow_task_threshold_ms,
                "slow task blocked poll"
            );
        }
        self.with_metrics(|m| {
            m.record_execution(elapsed);
            if slow {
                m.slow_tasks += 1;
            }
        });

        status
    }
}
