use serde::{Deserialize, Serialize};

/// What happened when the scheduler handed a task to `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    /// The call returned `Ok`.
    Completed,
    /// The call returned `Err`.
    Failed,
    /// The call panicked.
    Panicked,
    /// Nothing ran: the task was cancelled or already taken by another poller.
    Skipped,
}

/// Summary of a single `run_due` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollReport {
    /// Calls that ran, whatever their outcome.
    pub executed: usize,
    /// Of `executed`, calls that returned an error.
    pub failed: usize,
    /// Of `executed`, calls that panicked.
    pub panicked: usize,
    /// Cancelled entries popped and dropped without running.
    pub discarded: usize,
}

impl PollReport {
    pub(crate) fn record(&mut self, status: RunStatus) {
        match status {
            RunStatus::Completed => self.executed += 1,
            RunStatus::Failed => {
                self.executed += 1;
                self.failed += 1;
            }
            RunStatus::Panicked => {
                self.executed += 1;
                self.panicked += 1;
            }
            RunStatus::Skipped => self.discarded += 1,
        }
    }

    /// Whether the pass found anything due at all.
    pub fn is_idle(&self) -> bool {
        self.executed == 0 && self.discarded == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_counts_by_status() {
        let mut report = PollReport::default();
        report.record(RunStatus::Completed);
        report.record(RunStatus::Failed);
        report.record(RunStatus::Panicked);
        report.record(RunStatus::Skipped);

        assert_eq!(report.executed, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.panicked, 1);
        assert_eq!(report.discarded, 1);
        assert!(!report.is_idle());
    }

    #[test]
    fn default_report_is_idle() {
        assert!(PollReport::default().is_idle());
    }
}
