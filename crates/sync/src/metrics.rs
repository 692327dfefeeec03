use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::PollReport;

/// Cumulative scheduler counters. Bookkeeping only; nothing reads these to
/// make scheduling decisions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerMetrics {
    /// Tasks accepted by `schedule`.
    pub tasks_scheduled: u64,
    /// Calls that ran, whatever their outcome.
    pub tasks_executed: u64,
    /// Calls that returned an error.
    pub tasks_failed: u64,
    /// Calls that panicked.
    pub tasks_panicked: u64,
    /// Calls that ran longer than the slow-task threshold.
    pub slow_tasks: u64,
    /// Tasks cancelled through `cancel_all`.
    pub tasks_bulk_cancelled: u64,
    /// Cancelled entries popped from the queue and dropped.
    pub cancelled_discarded: u64,
    /// Number of `poll` passes.
    pub polls: u64,
    /// Mean wall time of a single call.
    pub avg_task_duration: Duration,
    /// When the last `poll` pass finished.
    pub last_poll: Option<DateTime<Utc>>,
}

impl SchedulerMetrics {
    /// Record one call's duration into the running mean.
    pub fn record_execution(&mut self, duration: Duration) {
        self.tasks_executed += 1;
        let count = self.tasks_executed;

        // Incremental mean: new_avg = prev_avg + (duration - prev_avg) / count
        self.avg_task_duration = if count == 1 {
            duration
        } else {
            let prev_nanos = self.avg_task_duration.as_nanos() as f64;
            let cur_nanos = duration.as_nanos() as f64;
            let avg_nanos = prev_nanos + (cur_nanos - prev_nanos) / count as f64;
            Duration::from_nanos(avg_nanos as u64)
        };
    }

    /// Fold the failure and discard counts of a finished pass.
    pub fn record_poll(&mut self, report: &PollReport) {
        self.polls += 1;
        self.tasks_failed += report.failed as u64;
        self.tasks_panicked += report.panicked as u64;
        self.cancelled_discarded += report.discarded as u64;
        self.last_poll = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_single_execution() {
        let mut m = SchedulerMetrics::default();
        m.record_execution(Duration::from_millis(100));

        assert_eq!(m.tasks_executed, 1);
        assert_eq!(m.avg_task_duration, Duration::from_millis(100));
    }

    #[test]
    fn record_multiple_executions_averages() {
        let mut m = SchedulerMetrics::default();
        m.record_execution(Duration::from_millis(100));
        m.record_execution(Duration::from_millis(200));

        assert_eq!(m.tasks_executed, 2);
        // Average of 100ms and 200ms = 150ms
        let avg = m.avg_task_duration.as_millis();
        assert!((140..=160).contains(&avg), "expected ~150ms, got {}ms", avg);
    }

    #[test]
    fn record_poll_accumulates() {
        let mut m = SchedulerMetrics::default();
        let report = PollReport {
            executed: 3,
            failed: 1,
            panicked: 1,
            discarded: 2,
        };
        m.record_poll(&report);
        m.record_poll(&PollReport::default());

        assert_eq!(m.polls, 2);
        assert_eq!(m.tasks_failed, 1);
        assert_eq!(m.tasks_panicked, 1);
        assert_eq!(m.cancelled_discarded, 2);
        assert!(m.last_poll.is_some());
    }

    #[test]
    fn default_metrics() {
        let m = SchedulerMetrics::default();
        assert_eq!(m.polls, 0);
        assert_eq!(m.avg_task_duration, Duration::ZERO);
        assert!(m.last_poll.is_none());
    }
}
